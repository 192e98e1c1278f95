use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Movie, MovieId, MoviePatch, MovieQuery, NewMovie, Profile, ProfileId, SortKey};

use super::migrations::MIGRATIONS;

const MOVIE_COLUMNS: &str = "id, profile_id, title, year, rating, poster_url, personal_rating,
                             verified, created_at, updated_at";

/// A database connection with CRUD methods for profiles and their movies.
///
/// Every movie operation takes the owning [`ProfileId`] explicitly; rows
/// belonging to other profiles are never visible.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Foreign key enforcement is per connection in SQLite.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Profile CRUD
impl Database {
    /// Create a profile. Names are unique regardless of case.
    pub fn create_profile(&self, name: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData(
                "profile name must not be empty".to_string(),
            ));
        }

        let created_at = Utc::now();
        self.conn
            .execute(
                "INSERT INTO profiles (name, name_key, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![name, match_key(name), created_at.to_rfc3339()],
            )
            .map_err(|e| unique_violation(e, "profile", name))?;

        let profile = Profile {
            id: ProfileId::from_raw(self.conn.last_insert_rowid()),
            name: name.to_string(),
            sort_key: None,
            created_at,
        };
        log::info!("Created profile '{}' ({})", profile.name, profile.id);
        Ok(profile)
    }

    /// List all profiles in creation order.
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, sort_key, created_at FROM profiles ORDER BY id")?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }

    /// Get a profile by id.
    pub fn get_profile(&self, id: ProfileId) -> Result<Profile> {
        self.conn
            .query_row(
                "SELECT id, name, sort_key, created_at FROM profiles WHERE id = ?1",
                [id],
                row_to_profile,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("profile", id))
    }

    /// Look up a profile by name, ignoring case.
    pub fn find_profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, name, sort_key, created_at FROM profiles WHERE name_key = ?1",
                [match_key(name)],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    /// Delete a profile and, through the cascade, all of its movies.
    ///
    /// Returns the number of movies removed with it.
    pub fn delete_profile(&self, id: ProfileId) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let movies: i64 = tx.query_row(
            "SELECT COUNT(*) FROM movies WHERE profile_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        let deleted = tx.execute("DELETE FROM profiles WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(Error::not_found("profile", id));
        }
        tx.commit()?;

        log::info!("Deleted profile {} with {} movie(s)", id, movies);
        Ok(usize::try_from(movies).unwrap_or(0))
    }

    /// Remember the ordering last chosen for a profile.
    pub fn set_sort_preference(&self, id: ProfileId, key: Option<SortKey>) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE profiles SET sort_key = ?2 WHERE id = ?1",
            rusqlite::params![id, key.map(SortKey::as_str)],
        )?;
        if updated == 0 {
            return Err(Error::not_found("profile", id));
        }
        Ok(())
    }

    fn require_profile(&self, id: ProfileId) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM profiles WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if exists {
            Ok(())
        } else {
            Err(Error::not_found("profile", id))
        }
    }
}

// Movie CRUD
impl Database {
    /// Insert a movie into a profile's collection.
    ///
    /// Fails with [`Error::Duplicate`] when the profile already holds a
    /// movie with the same title (ignoring case).
    pub fn add_movie(&self, profile: ProfileId, movie: &NewMovie) -> Result<Movie> {
        movie.validate()?;
        self.require_profile(profile)?;

        let title = movie.title.trim();
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO movies (
                    profile_id, title, title_key, year, rating, poster_url,
                    personal_rating, verified, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    profile,
                    title,
                    match_key(title),
                    movie.year,
                    movie.rating,
                    movie.poster_url,
                    movie.personal_rating,
                    movie.verified,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .map_err(|e| unique_violation(e, "movie", title))?;

        let stored = Movie {
            id: MovieId::from_raw(self.conn.last_insert_rowid()),
            profile_id: profile,
            title: title.to_string(),
            year: movie.year,
            rating: movie.rating,
            poster_url: movie.poster_url.clone(),
            personal_rating: movie.personal_rating,
            verified: movie.verified,
            created_at: now,
            updated_at: now,
        };
        log::debug!("Stored movie '{}' for profile {}", stored.title, profile);
        Ok(stored)
    }

    /// Find a movie by title (ignoring case) in a profile's collection.
    pub fn find_movie(&self, profile: ProfileId, title: &str) -> Result<Option<Movie>> {
        let sql =
            format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE profile_id = ?1 AND title_key = ?2");
        let movie = self
            .conn
            .query_row(&sql, rusqlite::params![profile, match_key(title)], row_to_movie)
            .optional()?;
        Ok(movie)
    }

    /// Apply a patch to the movie with the given title.
    pub fn update_movie(&self, profile: ProfileId, title: &str, patch: &MoviePatch) -> Result<Movie> {
        patch.validate()?;
        let mut movie = self
            .find_movie(profile, title)?
            .ok_or_else(|| Error::not_found("movie", title.trim()))?;
        movie.apply(patch);

        self.conn.execute(
            "UPDATE movies SET
                year = ?2, rating = ?3, poster_url = ?4, personal_rating = ?5,
                verified = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                movie.id,
                movie.year,
                movie.rating,
                movie.poster_url,
                movie.personal_rating,
                movie.verified,
                movie.updated_at.to_rfc3339(),
            ],
        )?;
        log::debug!("Updated movie '{}' for profile {}", movie.title, profile);
        Ok(movie)
    }

    /// Remove the movie with the given title.
    pub fn delete_movie(&self, profile: ProfileId, title: &str) -> Result<()> {
        let deleted = self.conn.execute(
            "DELETE FROM movies WHERE profile_id = ?1 AND title_key = ?2",
            rusqlite::params![profile, match_key(title)],
        )?;
        if deleted == 0 {
            return Err(Error::not_found("movie", title.trim()));
        }
        log::debug!("Deleted movie '{}' for profile {}", title.trim(), profile);
        Ok(())
    }

    /// List a profile's movies, filtered and ordered by `query`.
    ///
    /// Without a sort key movies come back in insertion order.
    pub fn list_movies(&self, profile: ProfileId, query: &MovieQuery) -> Result<Vec<Movie>> {
        self.require_profile(profile)?;

        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE profile_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let movies = stmt
            .query_map([profile], row_to_movie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(query.apply(movies))
    }
}

/// Case-folded form used for uniqueness and lookups, non-ASCII letters included.
fn match_key(s: &str) -> String {
    s.trim().to_lowercase()
}

fn unique_violation(err: rusqlite::Error, entity: &'static str, key: &str) -> Error {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::duplicate(entity, key)
        }
        other => Error::Database(other),
    }
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
    let sort_key = row
        .get::<_, Option<String>>(2)?
        .map(|s| s.parse::<SortKey>())
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Profile {
        id: row.get(0)?,
        name: row.get(1)?,
        sort_key,
        created_at: parse_timestamp(row, 3)?,
    })
}

fn row_to_movie(row: &rusqlite::Row) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        profile_id: row.get(1)?,
        title: row.get(2)?,
        year: row.get(3)?,
        rating: row.get(4)?,
        poster_url: row.get(5)?,
        personal_rating: row.get(6)?,
        verified: row.get(7)?,
        created_at: parse_timestamp(row, 8)?,
        updated_at: parse_timestamp(row, 9)?,
    })
}
