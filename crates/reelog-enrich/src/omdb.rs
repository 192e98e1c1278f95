//! OMDb metadata client.
//!
//! Resolves a title with a single `GET ?apikey=..&t=..` request against
//! the Open Movie Database. The provider signals a miss in-band with
//! `"Response": "False"`; placeholder values of `"N/A"` are treated as
//! absent fields.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{LookupError, LookupResult};
use crate::lookup::{LookupOutcome, MetadataLookup, MovieMetadata};

const OMDB_SOURCE: &str = "OMDb";

/// Public OMDb endpoint.
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

/// Upper bound on a single lookup.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// API response types (private -- OMDb uses PascalCase and string values)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    title: Option<String>,
    year: Option<String>,
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    error: Option<String>,
}

/// OMDb API client.
#[derive(Clone)]
pub struct OmdbClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
    timeout_secs: u64,
}

impl fmt::Debug for OmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OmdbClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl OmdbClient {
    /// Create a client for the public OMDb endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: Option<String>) -> LookupResult<Self> {
        Self::with_options(api_key, DEFAULT_OMDB_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client against a specific endpoint with a request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_options(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> LookupResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("reelog/0.1.0 (https://github.com/oxur/reelog)")
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    /// Create a client from the loaded configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> LookupResult<Self> {
        Self::with_options(
            config.omdb_api_key.clone(),
            config.omdb_base_url.clone(),
            config.request_timeout_secs,
        )
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn request_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                source_name: OMDB_SOURCE.to_string(),
                seconds: self.timeout_secs,
            }
        } else {
            LookupError::Request(err)
        }
    }
}

#[async_trait]
impl MetadataLookup for OmdbClient {
    async fn lookup(&self, title: &str) -> LookupResult<LookupOutcome> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;
        log::info!("Searching OMDb for '{}'", title);

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("apikey", api_key), ("t", title)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?
            .error_for_status()
            .map_err(|e| LookupError::Http {
                source_name: OMDB_SOURCE.to_string(),
                message: e.to_string(),
            })?;

        let body: OmdbResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.request_error(e)
            } else {
                LookupError::Parse {
                    source_name: OMDB_SOURCE.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let outcome = interpret(body)?;
        match &outcome {
            LookupOutcome::Found(meta) => log::debug!("OMDb matched '{}' to '{}'", title, meta.title),
            LookupOutcome::NotFound => log::info!("OMDb has no match for '{}'", title),
        }
        Ok(outcome)
    }
}

fn interpret(body: OmdbResponse) -> LookupResult<LookupOutcome> {
    if !body.response.eq_ignore_ascii_case("true") {
        let message = body.error.unwrap_or_else(|| "unknown error".to_string());
        if message.to_lowercase().contains("not found") {
            return Ok(LookupOutcome::NotFound);
        }
        return Err(LookupError::Provider {
            source_name: OMDB_SOURCE.to_string(),
            message,
        });
    }

    let title = available(body.title).ok_or_else(|| LookupError::Parse {
        source_name: OMDB_SOURCE.to_string(),
        message: "response is missing a title".to_string(),
    })?;

    Ok(LookupOutcome::Found(MovieMetadata {
        title,
        year: available(body.year).as_deref().and_then(parse_year),
        rating: available(body.imdb_rating)
            .and_then(|r| r.parse::<f64>().ok())
            .filter(|r| r.is_finite() && reelog_core::model::RATING_RANGE.contains(r)),
        poster_url: available(body.poster),
    }))
}

fn available(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

/// Leading four-digit year, so `"2005–2008"` yields 2005.
fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw.chars().take_while(char::is_ascii_digit).collect();
    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(json: serde_json::Value) -> LookupResult<LookupOutcome> {
        interpret(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn test_interpret_found() {
        let outcome = parse(json!({
            "Title": "The Matrix",
            "Year": "1999",
            "imdbRating": "8.7",
            "Poster": "https://example.com/matrix.jpg",
            "Response": "True"
        }))
        .unwrap();

        assert_eq!(
            outcome,
            LookupOutcome::Found(
                MovieMetadata::new("The Matrix")
                    .with_year(1999)
                    .with_rating(8.7)
                    .with_poster_url("https://example.com/matrix.jpg")
            )
        );
    }

    #[test]
    fn test_interpret_not_available_fields() {
        let outcome = parse(json!({
            "Title": "Obscure Short",
            "Year": "N/A",
            "imdbRating": "N/A",
            "Poster": "N/A",
            "Response": "True"
        }))
        .unwrap();

        assert_eq!(outcome, LookupOutcome::Found(MovieMetadata::new("Obscure Short")));
    }

    #[test]
    fn test_interpret_not_found() {
        let outcome = parse(json!({"Response": "False", "Error": "Movie not found!"})).unwrap();
        assert_eq!(outcome, LookupOutcome::NotFound);
    }

    #[test]
    fn test_interpret_provider_error() {
        let err = parse(json!({"Response": "False", "Error": "Request limit reached!"}))
            .unwrap_err();
        assert!(matches!(err, LookupError::Provider { .. }));
    }

    #[test]
    fn test_interpret_missing_title_is_parse_error() {
        let err = parse(json!({"Response": "True", "Year": "1999"})).unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }

    #[test]
    fn test_parse_year_ranges() {
        assert_eq!(parse_year("1999"), Some(1999));
        assert_eq!(parse_year("2005–2008"), Some(2005));
        assert_eq!(parse_year("2019–"), Some(2019));
        assert_eq!(parse_year("99"), None);
        assert_eq!(parse_year("unknown"), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = OmdbClient::new(Some("secret-key".to_string())).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("OmdbClient"));
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let client = OmdbClient::new(Some("  ".to_string())).unwrap();
        assert!(!client.has_api_key());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let client = OmdbClient::new(None).unwrap();
        let err = client.lookup("The Matrix").await.unwrap_err();
        assert!(matches!(err, LookupError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_lookup_sends_key_and_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("t", "the matrix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": "The Matrix",
                "Year": "1999",
                "imdbRating": "8.7",
                "Poster": "https://example.com/matrix.jpg",
                "Response": "True"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OmdbClient::with_options(Some("test-key".to_string()), server.uri(), 5).unwrap();
        let outcome = client.lookup("the matrix").await.unwrap();

        match outcome {
            LookupOutcome::Found(meta) => {
                assert_eq!(meta.title, "The Matrix");
                assert_eq!(meta.year, Some(1999));
            }
            LookupOutcome::NotFound => panic!("expected a match"),
        }
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "False", "Error": "Movie not found!"})),
            )
            .mount(&server)
            .await;

        let client = OmdbClient::with_options(Some("k".to_string()), server.uri(), 5).unwrap();
        assert_eq!(client.lookup("zzzz").await.unwrap(), LookupOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = OmdbClient::with_options(Some("k".to_string()), server.uri(), 5).unwrap();
        let err = client.lookup("The Matrix").await.unwrap_err();
        assert!(matches!(err, LookupError::Http { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_lookup_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = OmdbClient::with_options(Some("k".to_string()), server.uri(), 5).unwrap();
        let err = client.lookup("The Matrix").await.unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_lookup_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"Response": "False", "Error": "Movie not found!"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = OmdbClient::with_options(Some("k".to_string()), server.uri(), 1).unwrap();
        let err = client.lookup("slow").await.unwrap_err();
        assert!(matches!(err, LookupError::Timeout { seconds: 1, .. }));
    }

    #[tokio::test]
    async fn test_lookup_unreachable_host() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client =
            OmdbClient::with_options(Some("k".to_string()), "http://127.0.0.1:9/", 2).unwrap();
        let err = client.lookup("The Matrix").await.unwrap_err();
        assert!(err.is_transient());
    }
}
