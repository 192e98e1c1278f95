//! Business rules layered over the store and the metadata lookup.
//!
//! Every operation names its profile explicitly; the service keeps no
//! notion of a current user.

use std::path::PathBuf;

use rand::seq::SliceRandom;
use reelog_core::model::{Movie, MoviePatch, MovieQuery, NewMovie, ProfileId, SortKey};
use reelog_core::policy::{DuplicatePolicy, LookupFailurePolicy};
use reelog_core::schema::Database;
use reelog_enrich::{Config, LookupError, LookupOutcome, MetadataLookup};

use crate::error::{CollectionError, CollectionResult};
use crate::site;
use crate::stats::CollectionStats;

/// Knobs that decide how adds reconcile and where the page is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOptions {
    pub on_lookup_failure: LookupFailurePolicy,
    pub on_duplicate: DuplicatePolicy,
    pub site_dir: PathBuf,
    pub template_path: Option<PathBuf>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            on_lookup_failure: LookupFailurePolicy::default(),
            on_duplicate: DuplicatePolicy::default(),
            site_dir: PathBuf::from("."),
            template_path: None,
        }
    }
}

impl ServiceOptions {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            on_lookup_failure: config.on_lookup_failure,
            on_duplicate: config.on_duplicate,
            site_dir: config.site_dir.clone(),
            template_path: config.template_path.clone(),
        }
    }

    #[must_use]
    pub fn with_lookup_failure(mut self, policy: LookupFailurePolicy) -> Self {
        self.on_lookup_failure = policy;
        self
    }

    #[must_use]
    pub fn with_duplicate(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    #[must_use]
    pub fn with_site_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.site_dir = dir.into();
        self
    }
}

/// What an add ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// Stored with provider metadata.
    Added(Movie),
    /// Stored as a title-only record because the lookup came back empty.
    Stub { movie: Movie, reason: String },
    /// An existing record had its metadata refreshed.
    Refreshed(Movie),
}

impl AddOutcome {
    #[must_use]
    pub const fn movie(&self) -> &Movie {
        match self {
            Self::Added(movie) | Self::Stub { movie, .. } | Self::Refreshed(movie) => movie,
        }
    }
}

/// Why a lookup produced no record.
enum Miss {
    NotFound,
    Failed(LookupError),
}

impl Miss {
    fn reason(&self) -> String {
        match self {
            Self::NotFound => "no match on the metadata provider".to_string(),
            Self::Failed(e) => e.to_string(),
        }
    }

    fn into_error(self, title: &str) -> CollectionError {
        match self {
            Self::NotFound => CollectionError::NotFound {
                entity: "metadata for movie",
                key: title.to_string(),
            },
            Self::Failed(e) => CollectionError::Lookup(e),
        }
    }
}

/// The collection service.
#[derive(Debug)]
pub struct CollectionService<L> {
    db: Database,
    lookup: L,
    options: ServiceOptions,
}

impl<L: MetadataLookup> CollectionService<L> {
    pub fn new(db: Database, lookup: L, options: ServiceOptions) -> Self {
        Self {
            db,
            lookup,
            options,
        }
    }

    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    #[must_use]
    pub const fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Look a title up and store the result in the profile's collection.
    ///
    /// The typed title is checked against the collection before any
    /// network call; the provider's canonical title is checked again
    /// before inserting. A failed lookup for a title that is already
    /// stored never overwrites the stored record.
    pub async fn add_movie(&self, profile: ProfileId, title: &str) -> CollectionResult<AddOutcome> {
        let title = require_title(title)?;
        self.db.get_profile(profile)?;

        let existing = self.db.find_movie(profile, title)?;
        if existing.is_some() && self.options.on_duplicate == DuplicatePolicy::Reject {
            return Err(CollectionError::Duplicate {
                entity: "movie",
                key: title.to_string(),
            });
        }

        let found = match self.lookup.lookup(title).await {
            Ok(LookupOutcome::Found(meta)) => Ok(meta.into_new_movie()),
            Ok(LookupOutcome::NotFound) => Err(Miss::NotFound),
            Err(e) => {
                log::warn!("Lookup for '{}' failed: {}", title, e);
                Err(Miss::Failed(e))
            }
        };

        match found {
            Ok(record) => self.store_verified(profile, existing, record),
            Err(miss) => {
                if existing.is_some() || self.options.on_lookup_failure == LookupFailurePolicy::Reject {
                    return Err(miss.into_error(title));
                }
                let movie = self.db.add_movie(profile, &NewMovie::stub(title))?;
                log::info!("Stored '{}' as an unverified stub", movie.title);
                Ok(AddOutcome::Stub {
                    reason: miss.reason(),
                    movie,
                })
            }
        }
    }

    fn store_verified(
        &self,
        profile: ProfileId,
        existing: Option<Movie>,
        record: NewMovie,
    ) -> CollectionResult<AddOutcome> {
        let target = match existing {
            Some(movie) => Some(movie),
            None => self.db.find_movie(profile, &record.title)?,
        };

        match target {
            None => Ok(AddOutcome::Added(self.db.add_movie(profile, &record)?)),
            Some(movie) if self.options.on_duplicate == DuplicatePolicy::Update => {
                let patch = MoviePatch::from_metadata(&record);
                let refreshed = self.db.update_movie(profile, &movie.title, &patch)?;
                log::info!("Refreshed metadata for '{}'", refreshed.title);
                Ok(AddOutcome::Refreshed(refreshed))
            }
            Some(movie) => Err(CollectionError::Duplicate {
                entity: "movie",
                key: movie.title,
            }),
        }
    }

    /// Change a stored movie's personal rating or metadata.
    pub fn update_movie(
        &self,
        profile: ProfileId,
        title: &str,
        patch: &MoviePatch,
    ) -> CollectionResult<Movie> {
        let title = require_title(title)?;
        if patch.is_empty() {
            return Err(CollectionError::Validation(
                "nothing to update".to_string(),
            ));
        }
        patch.validate()?;
        Ok(self.db.update_movie(profile, title, patch)?)
    }

    pub fn delete_movie(&self, profile: ProfileId, title: &str) -> CollectionResult<()> {
        let title = require_title(title)?;
        Ok(self.db.delete_movie(profile, title)?)
    }

    /// All movies, in the profile's remembered order.
    pub fn list_movies(&self, profile: ProfileId) -> CollectionResult<Vec<Movie>> {
        let sort = self.db.get_profile(profile)?.sort_key;
        Ok(self
            .db
            .list_movies(profile, &MovieQuery::new().sorted_by_opt(sort))?)
    }

    /// Sort the collection and remember the choice for later listings
    /// and the generated page.
    pub fn sort_movies(&self, profile: ProfileId, key: SortKey) -> CollectionResult<Vec<Movie>> {
        self.db.set_sort_preference(profile, Some(key))?;
        Ok(self
            .db
            .list_movies(profile, &MovieQuery::new().sorted_by(key))?)
    }

    /// Case-insensitive substring search on titles.
    pub fn search_movies(&self, profile: ProfileId, term: &str) -> CollectionResult<Vec<Movie>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(CollectionError::Validation(
                "search term must not be empty".to_string(),
            ));
        }
        let sort = self.db.get_profile(profile)?.sort_key;
        Ok(self.db.list_movies(
            profile,
            &MovieQuery::new().matching(term).sorted_by_opt(sort),
        )?)
    }

    pub fn stats(&self, profile: ProfileId) -> CollectionResult<CollectionStats> {
        let movies = self.db.list_movies(profile, &MovieQuery::new())?;
        CollectionStats::compute(&movies)
    }

    /// Pick a movie for tonight.
    pub fn random_movie(&self, profile: ProfileId) -> CollectionResult<Movie> {
        let movies = self.db.list_movies(profile, &MovieQuery::new())?;
        movies
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(CollectionError::EmptyCollection)
    }

    /// Render the profile's page without writing it.
    pub fn render_website(&self, profile: ProfileId) -> CollectionResult<String> {
        let owner = self.db.get_profile(profile)?;
        let movies = self
            .db
            .list_movies(profile, &MovieQuery::new().sorted_by_opt(owner.sort_key))?;
        if movies.is_empty() {
            return Err(CollectionError::EmptyCollection);
        }

        let template = site::load_template(self.options.template_path.as_deref())?;
        Ok(site::render_page(&template, &owner.site_title(), &movies))
    }

    /// Render and write the profile's page, returning where it went.
    pub fn generate_website(&self, profile: ProfileId) -> CollectionResult<PathBuf> {
        let html = self.render_website(profile)?;
        let owner = self.db.get_profile(profile)?;
        site::write_page(&self.options.site_dir, &owner.site_file_name(), &html)
    }
}

fn require_title(title: &str) -> CollectionResult<&str> {
    let title = title.trim();
    if title.is_empty() {
        Err(CollectionError::Validation(
            "movie title must not be empty".to_string(),
        ))
    } else {
        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelog_enrich::{LookupResult, MovieMetadata};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Answers from a fixed table keyed by lowercase title; unknown titles
    /// are "not found". `fail` turns every call into a network error.
    #[derive(Debug, Default)]
    struct ScriptedLookup {
        answers: HashMap<String, MovieMetadata>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl ScriptedLookup {
        fn with(mut self, query: &str, meta: MovieMetadata) -> Self {
            self.answers.insert(query.to_lowercase(), meta);
            self
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetadataLookup for ScriptedLookup {
        async fn lookup(&self, title: &str) -> LookupResult<LookupOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LookupError::Http {
                    source_name: "OMDb".to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(self
                .answers
                .get(&title.to_lowercase())
                .cloned()
                .map_or(LookupOutcome::NotFound, LookupOutcome::Found))
        }
    }

    fn catalogue() -> ScriptedLookup {
        ScriptedLookup::default()
            .with(
                "the matrix",
                MovieMetadata::new("The Matrix")
                    .with_year(1999)
                    .with_rating(8.7)
                    .with_poster_url("https://img.example.com/matrix.jpg"),
            )
            .with(
                "matrix",
                MovieMetadata::new("The Matrix").with_year(1999).with_rating(8.7),
            )
            .with(
                "inception",
                MovieMetadata::new("Inception").with_year(2010).with_rating(8.8),
            )
            .with("a", MovieMetadata::new("A").with_year(2001).with_rating(5.0))
            .with("b", MovieMetadata::new("B").with_year(1990).with_rating(9.0))
    }

    fn service_with(
        lookup: ScriptedLookup,
        options: ServiceOptions,
    ) -> (CollectionService<ScriptedLookup>, ProfileId) {
        let db = Database::open_in_memory().unwrap();
        let profile = db.create_profile("Sam").unwrap().id;
        (CollectionService::new(db, lookup, options), profile)
    }

    fn service(lookup: ScriptedLookup) -> (CollectionService<ScriptedLookup>, ProfileId) {
        service_with(lookup, ServiceOptions::default())
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_add_stores_looked_up_metadata() {
        let (svc, profile) = service(catalogue());

        let outcome = svc.add_movie(profile, "The Matrix").await.unwrap();
        assert!(matches!(outcome, AddOutcome::Added(_)));

        let stored = svc
            .database()
            .find_movie(profile, "The Matrix")
            .unwrap()
            .unwrap();
        assert_eq!(stored.year, Some(1999));
        assert_eq!(stored.rating, Some(8.7));
        assert_eq!(
            stored.poster_url.as_deref(),
            Some("https://img.example.com/matrix.jpg")
        );
        assert!(stored.verified);
    }

    #[tokio::test]
    async fn test_add_uses_canonical_title() {
        let (svc, profile) = service(catalogue());
        let outcome = svc.add_movie(profile, "  matrix ").await.unwrap();
        assert_eq!(outcome.movie().title, "The Matrix");
    }

    #[tokio::test]
    async fn test_add_blank_title_is_rejected_before_lookup() {
        let (svc, profile) = service(catalogue());
        let err = svc.add_movie(profile, "   ").await.unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));
        assert_eq!(svc.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_stores_stub_by_default() {
        let (svc, profile) = service(ScriptedLookup::failing());

        let outcome = svc.add_movie(profile, "Heat").await.unwrap();
        match outcome {
            AddOutcome::Stub { movie, reason } => {
                assert_eq!(movie.title, "Heat");
                assert!(movie.is_stub());
                assert!(reason.contains("connection refused"));
            }
            other => panic!("expected stub, got {other:?}"),
        }

        let stored = svc.database().find_movie(profile, "heat").unwrap().unwrap();
        assert!(!stored.verified);
        assert_eq!(stored.year, None);
    }

    #[tokio::test]
    async fn test_lookup_failure_rejected_by_policy() {
        let (svc, profile) = service_with(
            ScriptedLookup::failing(),
            ServiceOptions::default().with_lookup_failure(LookupFailurePolicy::Reject),
        );

        let err = svc.add_movie(profile, "Heat").await.unwrap_err();
        assert!(matches!(err, CollectionError::Lookup(_)));
        assert!(svc.list_movies(profile).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_title_stub_or_reject() {
        let (svc, profile) = service(catalogue());
        let outcome = svc.add_movie(profile, "Nonexistent Film").await.unwrap();
        assert!(matches!(outcome, AddOutcome::Stub { .. }));

        let (svc, profile) = service_with(
            catalogue(),
            ServiceOptions::default().with_lookup_failure(LookupFailurePolicy::Reject),
        );
        let err = svc.add_movie(profile, "Nonexistent Film").await.unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { .. }));
        assert!(svc.list_movies(profile).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_rejected_without_lookup() {
        let (svc, profile) = service(catalogue());
        svc.add_movie(profile, "The Matrix").await.unwrap();
        assert_eq!(svc.lookup.calls(), 1);

        let err = svc.add_movie(profile, "the matrix").await.unwrap_err();
        assert!(matches!(err, CollectionError::Duplicate { .. }));
        assert_eq!(svc.lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_ascii_duplicate_rejected_and_deleted_by_any_case() {
        let (svc, profile) = service(ScriptedLookup::default());
        svc.add_movie(profile, "Amélie").await.unwrap();

        let err = svc.add_movie(profile, "AMÉLIE").await.unwrap_err();
        assert!(matches!(err, CollectionError::Duplicate { .. }));
        assert_eq!(titles(&svc.search_movies(profile, "amélie").unwrap()), vec!["Amélie"]);

        svc.delete_movie(profile, "amélie").unwrap();
        assert!(svc.list_movies(profile).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_canonical_title_rejected() {
        let (svc, profile) = service(catalogue());
        svc.add_movie(profile, "The Matrix").await.unwrap();

        let err = svc.add_movie(profile, "matrix").await.unwrap_err();
        assert!(matches!(err, CollectionError::Duplicate { .. }));
        assert_eq!(svc.list_movies(profile).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_update_refreshes_and_keeps_personal_rating() {
        let (svc, profile) = service_with(
            catalogue(),
            ServiceOptions::default().with_duplicate(DuplicatePolicy::Update),
        );
        svc.database()
            .add_movie(profile, &NewMovie::stub("The Matrix"))
            .unwrap();
        svc.update_movie(
            profile,
            "The Matrix",
            &MoviePatch::new().with_personal_rating(9.5),
        )
        .unwrap();

        let outcome = svc.add_movie(profile, "The Matrix").await.unwrap();
        let movie = match outcome {
            AddOutcome::Refreshed(movie) => movie,
            other => panic!("expected refresh, got {other:?}"),
        };
        assert!(movie.verified);
        assert_eq!(movie.year, Some(1999));
        assert_eq!(movie.personal_rating, Some(9.5));
        assert_eq!(svc.list_movies(profile).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_existing_record() {
        let (svc, profile) = service_with(
            ScriptedLookup::failing(),
            ServiceOptions::default().with_duplicate(DuplicatePolicy::Update),
        );
        svc.database()
            .add_movie(profile, &NewMovie::verified("Heat").with_year(1995))
            .unwrap();

        let err = svc.add_movie(profile, "Heat").await.unwrap_err();
        assert!(matches!(err, CollectionError::Lookup(_)));

        let stored = svc.database().find_movie(profile, "Heat").unwrap().unwrap();
        assert!(stored.verified);
        assert_eq!(stored.year, Some(1995));
    }

    #[tokio::test]
    async fn test_add_to_unknown_profile() {
        let (svc, _) = service(catalogue());
        let err = svc
            .add_movie(ProfileId::from_raw(404), "The Matrix")
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { entity: "profile", .. }));
        assert_eq!(svc.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_same_title_in_two_profiles() {
        let (svc, sam) = service(catalogue());
        let alex = svc.database().create_profile("Alex").unwrap().id;

        svc.add_movie(sam, "The Matrix").await.unwrap();
        svc.add_movie(alex, "The Matrix").await.unwrap();
        svc.add_movie(alex, "Inception").await.unwrap();

        assert_eq!(titles(&svc.list_movies(sam).unwrap()), vec!["The Matrix"]);
        assert_eq!(
            titles(&svc.list_movies(alex).unwrap()),
            vec!["The Matrix", "Inception"]
        );
    }

    #[test]
    fn test_update_validates_personal_rating() {
        let (svc, profile) = service(catalogue());
        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();

        let err = svc
            .update_movie(profile, "Heat", &MoviePatch::new().with_personal_rating(10.1))
            .unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));

        let err = svc
            .update_movie(profile, "Heat", &MoviePatch::new().with_personal_rating(-1.0))
            .unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));

        let movie = svc
            .update_movie(profile, "Heat", &MoviePatch::new().with_personal_rating(7.5))
            .unwrap();
        assert_eq!(movie.personal_rating, Some(7.5));
    }

    #[test]
    fn test_update_metadata_fields() {
        let (svc, profile) = service(catalogue());
        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();

        let movie = svc
            .update_movie(
                profile,
                "heat",
                &MoviePatch::new()
                    .with_year(1995)
                    .with_rating(8.3)
                    .with_poster_url("https://img.example.com/heat.jpg"),
            )
            .unwrap();
        assert_eq!(movie.year, Some(1995));
        assert_eq!(movie.rating, Some(8.3));
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://img.example.com/heat.jpg")
        );
    }

    #[test]
    fn test_update_missing_movie_and_empty_patch() {
        let (svc, profile) = service(catalogue());
        let err = svc
            .update_movie(profile, "Ghost", &MoviePatch::new().with_year(2000))
            .unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { .. }));

        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();
        let err = svc
            .update_movie(profile, "Heat", &MoviePatch::new())
            .unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));
    }

    #[test]
    fn test_delete_movie() {
        let (svc, profile) = service(catalogue());
        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();

        svc.delete_movie(profile, "Heat").unwrap();
        let err = svc.delete_movie(profile, "Heat").unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_sort_is_remembered_for_listing() {
        let (svc, profile) = service(catalogue());
        svc.add_movie(profile, "A").await.unwrap();
        svc.add_movie(profile, "B").await.unwrap();

        assert_eq!(titles(&svc.list_movies(profile).unwrap()), vec!["A", "B"]);

        let sorted = svc.sort_movies(profile, SortKey::RatingDesc).unwrap();
        assert_eq!(titles(&sorted), vec!["B", "A"]);
        assert_eq!(titles(&svc.list_movies(profile).unwrap()), vec!["B", "A"]);

        let by_year = svc.sort_movies(profile, SortKey::YearDesc).unwrap();
        assert_eq!(titles(&by_year), vec!["A", "B"]);

        let by_title = svc.sort_movies(profile, SortKey::TitleAsc).unwrap();
        assert_eq!(titles(&by_title), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_search() {
        let (svc, profile) = service(catalogue());
        svc.add_movie(profile, "The Matrix").await.unwrap();
        svc.add_movie(profile, "Inception").await.unwrap();

        let found = svc.search_movies(profile, "mat").unwrap();
        assert_eq!(titles(&found), vec!["The Matrix"]);

        assert!(svc.search_movies(profile, "xyz").unwrap().is_empty());
        assert!(matches!(
            svc.search_movies(profile, " "),
            Err(CollectionError::Validation(_))
        ));
    }

    #[test]
    fn test_stats() {
        let (svc, profile) = service(catalogue());
        for (title, rating) in [("A", 8.0), ("B", 6.0), ("C", 10.0)] {
            svc.database()
                .add_movie(profile, &NewMovie::verified(title).with_rating(rating))
                .unwrap();
        }

        let stats = svc.stats(profile).unwrap();
        assert!((stats.mean - 8.0).abs() < f64::EPSILON);
        assert!((stats.median - 8.0).abs() < f64::EPSILON);
        assert_eq!(stats.best.title, "C");
        assert_eq!(stats.worst.title, "B");
    }

    #[test]
    fn test_stats_on_empty_collection() {
        let (svc, profile) = service(catalogue());
        assert!(matches!(
            svc.stats(profile),
            Err(CollectionError::EmptyCollection)
        ));
    }

    #[test]
    fn test_random_movie() {
        let (svc, profile) = service(catalogue());
        assert!(matches!(
            svc.random_movie(profile),
            Err(CollectionError::EmptyCollection)
        ));

        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();
        assert_eq!(svc.random_movie(profile).unwrap().title, "Heat");
    }

    #[tokio::test]
    async fn test_website_is_idempotent_and_follows_sort() {
        let (svc, profile) = service(catalogue());
        svc.add_movie(profile, "A").await.unwrap();
        svc.add_movie(profile, "B").await.unwrap();
        svc.sort_movies(profile, SortKey::RatingDesc).unwrap();

        let first = svc.render_website(profile).unwrap();
        let second = svc.render_website(profile).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Sam's Movie App"));

        let b = first.find(r#"<div class="movie-title">B</div>"#).unwrap();
        let a = first.find(r#"<div class="movie-title">A</div>"#).unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_website_on_empty_collection() {
        let (svc, profile) = service(catalogue());
        assert!(matches!(
            svc.render_website(profile),
            Err(CollectionError::EmptyCollection)
        ));
    }

    #[tokio::test]
    async fn test_generate_website_writes_profile_page() {
        let dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let profile = db.create_profile("Jane Doe").unwrap().id;
        let svc = CollectionService::new(
            db,
            catalogue(),
            ServiceOptions::default().with_site_dir(dir.path()),
        );
        svc.add_movie(profile, "Inception").await.unwrap();

        let path = svc.generate_website(profile).unwrap();
        assert_eq!(path, dir.path().join("Jane_Doe.html"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, svc.render_website(profile).unwrap());

        svc.generate_website(profile).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
    }

    #[tokio::test]
    async fn test_generated_page_stays_inside_site_dir() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("site");
        let db = Database::open_in_memory().unwrap();
        let profile = db.create_profile("../escaped").unwrap().id;
        let svc = CollectionService::new(
            db,
            catalogue(),
            ServiceOptions::default().with_site_dir(&site_dir),
        );
        svc.add_movie(profile, "Inception").await.unwrap();

        let path = svc.generate_website(profile).unwrap();
        assert_eq!(path.parent(), Some(site_dir.as_path()));
        assert!(path.exists());
        assert!(!dir.path().join("escaped.html").exists());
    }

    #[test]
    fn test_deleted_profile_has_no_movies() {
        let (svc, profile) = service(catalogue());
        svc.database()
            .add_movie(profile, &NewMovie::stub("Heat"))
            .unwrap();
        svc.database().delete_profile(profile).unwrap();

        assert!(matches!(
            svc.list_movies(profile),
            Err(CollectionError::NotFound { entity: "profile", .. })
        ));
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            on_lookup_failure: LookupFailurePolicy::Reject,
            on_duplicate: DuplicatePolicy::Update,
            site_dir: PathBuf::from("/srv/www"),
            ..Config::default()
        };
        let options = ServiceOptions::from_config(&config);
        assert_eq!(options.on_lookup_failure, LookupFailurePolicy::Reject);
        assert_eq!(options.on_duplicate, DuplicatePolicy::Update);
        assert_eq!(options.site_dir, PathBuf::from("/srv/www"));
    }
}
