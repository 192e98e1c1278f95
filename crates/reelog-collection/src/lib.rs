//! Collection service for reelog.
//!
//! Reconciles provider lookups with the local store, computes rating
//! statistics, renders the static collection page, and tracks which
//! profile a session is acting on.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod service;
pub mod session;
pub mod site;
pub mod stats;

pub use error::{CollectionError, CollectionResult};
pub use service::{AddOutcome, CollectionService, ServiceOptions};
pub use session::{Session, SessionState};
pub use stats::CollectionStats;
