//! Descriptive statistics over a profile's ratings.

use reelog_core::model::Movie;

use crate::error::{CollectionError, CollectionResult};

/// Summary of a collection's effective ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStats {
    /// Movies in the collection, rated or not.
    pub total: usize,
    /// Movies that contributed a rating.
    pub rated: usize,
    pub mean: f64,
    pub median: f64,
    /// First movie, in insertion order, holding the highest rating.
    pub best: Movie,
    /// First movie, in insertion order, holding the lowest rating.
    pub worst: Movie,
}

impl CollectionStats {
    /// Compute statistics over movies given in insertion order.
    ///
    /// Movies without a rating are skipped. Fails with
    /// [`CollectionError::EmptyCollection`] when nothing is left.
    pub fn compute(movies: &[Movie]) -> CollectionResult<Self> {
        let rated: Vec<(&Movie, f64)> = movies
            .iter()
            .filter_map(|m| m.effective_rating().map(|r| (m, r)))
            .collect();

        let Some(&(first, first_rating)) = rated.first() else {
            return Err(CollectionError::EmptyCollection);
        };

        let (mut best, mut best_rating) = (first, first_rating);
        let (mut worst, mut worst_rating) = (first, first_rating);
        for &(movie, rating) in &rated[1..] {
            if rating > best_rating {
                best = movie;
                best_rating = rating;
            }
            if rating < worst_rating {
                worst = movie;
                worst_rating = rating;
            }
        }

        let ratings: Vec<f64> = rated.iter().map(|&(_, r)| r).collect();

        Ok(Self {
            total: movies.len(),
            rated: ratings.len(),
            mean: mean(&ratings),
            median: median(ratings),
            best: best.clone(),
            worst: worst.clone(),
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
