use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::model::ids::{MovieId, ProfileId};

/// Inclusive bounds for both provider and personal ratings.
pub const RATING_RANGE: RangeInclusive<f64> = 0.0..=10.0;

/// Check that a rating is a finite number inside [`RATING_RANGE`].
pub fn validate_rating(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && RATING_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{field} must be between {} and {}, got {value}",
            RATING_RANGE.start(),
            RATING_RANGE.end()
        )))
    }
}

fn validate_year(value: i32) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "year must be a positive number, got {value}"
        )))
    }
}

/// A movie in a profile's collection.
///
/// Metadata fields are optional: a stub record carries only its title
/// because the provider lookup failed or found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub profile_id: ProfileId,
    pub title: String,

    /// Release year reported by the provider.
    pub year: Option<i32>,

    /// Provider rating on a 0-10 scale.
    pub rating: Option<f64>,

    pub poster_url: Option<String>,

    /// Rating assigned by the user, 0-10.
    pub personal_rating: Option<f64>,

    /// `false` for stub records that were never matched by the provider.
    pub verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// The rating used for statistics and ordering: the personal rating
    /// when the user set one, otherwise the provider rating.
    #[must_use]
    pub fn effective_rating(&self) -> Option<f64> {
        self.personal_rating.or(self.rating)
    }

    #[must_use]
    pub const fn is_stub(&self) -> bool {
        !self.verified
    }

    /// Apply the fields set in `patch`, leaving the others untouched.
    pub fn apply(&mut self, patch: &MoviePatch) {
        if let Some(year) = patch.year {
            self.year = Some(year);
        }
        if let Some(rating) = patch.rating {
            self.rating = Some(rating);
        }
        if let Some(poster_url) = &patch.poster_url {
            self.poster_url = Some(poster_url.clone());
        }
        if let Some(personal_rating) = patch.personal_rating {
            self.personal_rating = Some(personal_rating);
        }
        if let Some(verified) = patch.verified {
            self.verified = verified;
        }
        self.updated_at = Utc::now();
    }
}

/// A movie that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
    pub personal_rating: Option<f64>,
    pub verified: bool,
}

impl NewMovie {
    /// A record backed by provider metadata.
    #[must_use]
    pub fn verified(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            rating: None,
            poster_url: None,
            personal_rating: None,
            verified: true,
        }
    }

    /// A title-only record with no provider match.
    #[must_use]
    pub fn stub(title: impl Into<String>) -> Self {
        Self {
            verified: false,
            ..Self::verified(title)
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

    #[must_use]
    pub fn with_personal_rating(mut self, rating: f64) -> Self {
        self.personal_rating = Some(rating);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidData("title must not be empty".to_string()));
        }
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(rating) = self.rating {
            validate_rating("rating", rating)?;
        }
        if let Some(rating) = self.personal_rating {
            validate_rating("personal rating", rating)?;
        }
        Ok(())
    }
}

/// A partial update to a stored movie. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePatch {
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub poster_url: Option<String>,
    pub personal_rating: Option<f64>,
    pub verified: Option<bool>,
}

impl MoviePatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    #[must_use]
    pub fn with_personal_rating(mut self, rating: f64) -> Self {
        self.personal_rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    /// Metadata refresh built from a freshly looked-up record. The
    /// personal rating is never touched.
    #[must_use]
    pub fn from_metadata(movie: &NewMovie) -> Self {
        Self {
            year: movie.year,
            rating: movie.rating,
            poster_url: movie.poster_url.clone(),
            personal_rating: None,
            verified: Some(movie.verified),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(year) = self.year {
            validate_year(year)?;
        }
        if let Some(rating) = self.rating {
            validate_rating("rating", rating)?;
        }
        if let Some(rating) = self.personal_rating {
            validate_rating("personal rating", rating)?;
        }
        Ok(())
    }
}
