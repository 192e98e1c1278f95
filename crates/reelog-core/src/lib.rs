//! Core domain model for reelog.
//!
//! This crate defines the profile and movie model, the query and policy
//! types shared by the other crates, and the SQLite persistence layer
//! that scopes every movie operation by its owning profile.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod policy;
pub mod schema;

pub use error::{Error, Result};
