use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::movie::Movie;

/// Orderings offered for a movie listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Highest effective rating first.
    RatingDesc,
    /// Newest release first.
    YearDesc,
    /// Oldest release first.
    YearAsc,
    /// Alphabetical, ignoring case.
    TitleAsc,
}

impl SortKey {
    pub const ALL: [Self; 4] = [Self::RatingDesc, Self::YearDesc, Self::YearAsc, Self::TitleAsc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RatingDesc => "rating_desc",
            Self::YearDesc => "year_desc",
            Self::YearAsc => "year_asc",
            Self::TitleAsc => "title_asc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RatingDesc => "rating (highest first)",
            Self::YearDesc => "year (latest first)",
            Self::YearAsc => "year (oldest first)",
            Self::TitleAsc => "title (A-Z)",
        }
    }

    fn compare(self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            Self::RatingDesc => {
                nones_last(a.effective_rating(), b.effective_rating(), |x, y| y.total_cmp(&x))
            }
            Self::YearDesc => nones_last(a.year, b.year, |x, y| y.cmp(&x)),
            Self::YearAsc => nones_last(a.year, b.year, |x, y| x.cmp(&y)),
            Self::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

fn nones_last<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::InvalidData(format!("unknown sort key: {s}")))
    }
}

/// Filter and ordering applied to a profile's movies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieQuery {
    pub sort: Option<SortKey>,
    pub search: Option<String>,
}

impl MovieQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    #[must_use]
    pub fn sorted_by_opt(mut self, key: Option<SortKey>) -> Self {
        self.sort = key;
        self
    }

    #[must_use]
    pub fn matching(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Case-insensitive substring match on the title. A blank term
    /// matches everything.
    #[must_use]
    pub fn matches(&self, movie: &Movie) -> bool {
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => movie
                .title
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Filter then stably sort movies given in insertion order, so ties
    /// keep insertion order.
    #[must_use]
    pub fn apply(&self, movies: Vec<Movie>) -> Vec<Movie> {
        let mut movies: Vec<Movie> = movies.into_iter().filter(|m| self.matches(m)).collect();
        if let Some(key) = self.sort {
            movies.sort_by(|a, b| key.compare(a, b));
        }
        movies
    }
}
