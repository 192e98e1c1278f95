/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Profiles (isolated collections)
CREATE TABLE IF NOT EXISTS profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    -- trimmed, Unicode-lowercased name; uniqueness and lookups go through it
    name_key TEXT NOT NULL UNIQUE,
    sort_key TEXT,
    created_at TEXT NOT NULL
);

-- Movies, owned by exactly one profile
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    title_key TEXT NOT NULL,
    year INTEGER,
    rating REAL,
    poster_url TEXT,
    personal_rating REAL,
    verified INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (profile_id, title_key)
);

CREATE INDEX IF NOT EXISTS idx_movies_profile_id ON movies(profile_id);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
