//! Policies that decide how an add reconciles with the provider and the
//! existing collection.

use serde::{Deserialize, Serialize};

/// What to do when the metadata lookup fails or finds nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupFailurePolicy {
    /// Store a title-only record flagged as unverified.
    #[default]
    Stub,
    /// Abort the add and surface the failure.
    Reject,
}

/// What to do when the title is already in the profile's collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with a duplicate error.
    #[default]
    Reject,
    /// Refresh the stored metadata, keeping the personal rating.
    Update,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(LookupFailurePolicy::default(), LookupFailurePolicy::Stub);
        assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Reject);
    }
}
