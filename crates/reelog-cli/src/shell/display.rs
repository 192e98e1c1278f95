//! Text rendering for movies and stats.

use reelog_collection::CollectionStats;
use reelog_core::model::Movie;

pub fn movie_line(movie: &Movie) -> String {
    let year = movie
        .year
        .map_or_else(|| "year unknown".to_string(), |y| y.to_string());
    let rating = movie
        .effective_rating()
        .map_or_else(|| "unrated".to_string(), |r| format!("{r:.1}"));
    let flag = if movie.is_stub() { " [unverified]" } else { "" };
    format!("{} ({year}): {rating}{flag}", movie.title)
}

pub fn stats_lines(stats: &CollectionStats) -> Vec<String> {
    let rated = |m: &Movie| {
        m.effective_rating()
            .map_or_else(String::new, |r| format!(" ({r:.1})"))
    };
    vec![
        format!("Rated movies: {} of {}", stats.rated, stats.total),
        format!("Average rating: {:.2}", stats.mean),
        format!("Median rating: {:.2}", stats.median),
        format!("Best movie: {}{}", stats.best.title, rated(&stats.best)),
        format!("Worst movie: {}{}", stats.worst.title, rated(&stats.worst)),
    ]
}
