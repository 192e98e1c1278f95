//! Metadata enrichment for reelog.
//!
//! Resolves a free-text movie title against an external provider (OMDb)
//! and loads the layered application configuration.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod omdb;

pub use config::Config;
pub use error::{LookupError, LookupResult};
pub use lookup::{LookupOutcome, MetadataLookup, MovieMetadata};
pub use omdb::OmdbClient;
