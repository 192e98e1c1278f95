//! The metadata lookup seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use reelog_core::model::NewMovie;

use crate::error::LookupResult;

/// Normalized metadata for a matched title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieMetadata {
    /// Canonical title as reported by the provider.
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
}

impl MovieMetadata {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            rating: None,
            poster_url: None,
        }
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.poster_url = Some(url.into());
        self
    }

    /// Convert into a verified record ready for storage.
    #[must_use]
    pub fn into_new_movie(self) -> NewMovie {
        NewMovie {
            title: self.title,
            year: self.year,
            rating: self.rating,
            poster_url: self.poster_url,
            personal_rating: None,
            verified: true,
        }
    }
}

/// Result of a successful round-trip to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(MovieMetadata),
    /// The provider answered but knows no such title.
    NotFound,
}

/// A source of movie metadata.
///
/// Each call is independent: no retries and no caching.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Resolve a title to metadata.
    async fn lookup(&self, title: &str) -> LookupResult<LookupOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_new_movie_is_verified() {
        let movie = MovieMetadata::new("Heat")
            .with_year(1995)
            .with_rating(8.3)
            .into_new_movie();
        assert!(movie.verified);
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.year, Some(1995));
        assert_eq!(movie.personal_rating, None);
    }
}
