//! Static HTML page for a profile's collection.
//!
//! Rendering is a pure function of the template, the page title, and the
//! ordered movies. Nothing time-dependent is embedded, so an unchanged
//! collection always renders to the same bytes.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};
use reelog_core::model::Movie;

use crate::error::{CollectionError, CollectionResult};

/// Replaced with the page title.
pub const TITLE_PLACEHOLDER: &str = "__TEMPLATE_TITLE__";

/// Replaced with one list item per movie.
pub const GRID_PLACEHOLDER: &str = "__TEMPLATE_MOVIE_GRID__";

/// Template used when no custom one is configured.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/index_template.html");

/// Read a template from disk, or fall back to [`DEFAULT_TEMPLATE`].
pub fn load_template(path: Option<&Path>) -> CollectionResult<String> {
    let Some(path) = path else {
        return Ok(DEFAULT_TEMPLATE.to_string());
    };

    let template = fs::read_to_string(path).map_err(|source| CollectionError::Output {
        path: path.to_path_buf(),
        source,
    })?;

    if !template.contains(GRID_PLACEHOLDER) {
        return Err(CollectionError::Validation(format!(
            "template {} has no {} placeholder",
            path.display(),
            GRID_PLACEHOLDER
        )));
    }
    Ok(template)
}

/// Render the full page.
///
/// Both placeholders are substituted in a single left-to-right pass, so
/// placeholder text inside the title or a movie is never expanded.
pub fn render_page(template: &str, title: &str, movies: &[Movie]) -> String {
    let title = encode_text(title);
    let tiles = render_tiles(movies);
    let substitutions = [(TITLE_PLACEHOLDER, &*title), (GRID_PLACEHOLDER, tiles.as_str())];

    let mut page = String::with_capacity(template.len() + tiles.len());
    let mut rest = template;
    while let Some((at, token, value)) = substitutions
        .iter()
        .filter_map(|&(token, value)| rest.find(token).map(|at| (at, token, value)))
        .min_by_key(|&(at, _, _)| at)
    {
        page.push_str(&rest[..at]);
        page.push_str(value);
        rest = &rest[at + token.len()..];
    }
    page.push_str(rest);
    page
}

/// Render one `<li>` tile per movie, in the given order.
pub fn render_tiles(movies: &[Movie]) -> String {
    movies.iter().map(render_tile).collect()
}

fn render_tile(movie: &Movie) -> String {
    let title = encode_text(&movie.title);
    let rating = movie
        .effective_rating()
        .map_or_else(|| "unrated".to_string(), |r| format!("{r:.1}"));
    let year = movie
        .year
        .map_or_else(|| "year unknown".to_string(), |y| y.to_string());

    let poster = match &movie.poster_url {
        Some(url) => format!(
            r#"<img class="movie-poster" src="{}" alt="{} - Rating: {}">"#,
            encode_double_quoted_attribute(url),
            encode_double_quoted_attribute(&movie.title),
            rating
        ),
        None => r#"<div class="movie-poster-missing">No poster</div>"#.to_string(),
    };

    format!(
        r#"        <li>
            <div class="movie">
                {poster}
                <div class="movie-title">{title}</div>
                <div class="movie-year">{year}</div>
                <div class="movie-rating">{rating}</div>
            </div>
        </li>
"#
    )
}

/// Write the rendered page, replacing any previous version.
///
/// `file_name` must be a bare file name; the page always lands directly
/// inside `dir`.
pub fn write_page(dir: &Path, file_name: &str, html: &str) -> CollectionResult<PathBuf> {
    if Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
        return Err(CollectionError::Validation(format!(
            "page name '{file_name}' is not a plain file name"
        )));
    }
    let path = dir.join(file_name);
    fs::create_dir_all(dir)
        .and_then(|()| fs::write(&path, html))
        .map_err(|source| CollectionError::Output {
            path: path.clone(),
            source,
        })?;
    log::info!("Wrote collection page to {}", path.display());
    Ok(path)
}
