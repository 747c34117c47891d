//! Error types for the entity store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::entities::{EntityId, EntityKind};
use crate::sanitize::ValidationErrors;

// == Store Error Enum ==
/// Unified error type for the entity store.
///
/// Every cache operation reports expected failures through this type rather
/// than panicking. The type is `Clone` because a de-duplicated fetch fans a
/// single completion out to every concurrent caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Sanitized payload failed schema validation (per-field issues)
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Fetch/update target does not exist on the backend
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    /// Network or backend failure; the cache is left unchanged
    #[error("remote call failed: {0}")]
    Remote(String),

    /// Durable storage could not be read or written
    #[error("storage error: {0}")]
    Storage(String),

    /// Payload was structurally malformed (e.g. not a JSON object)
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl StoreError {
    /// Convenience constructor for a not-found error.
    pub fn not_found(kind: EntityKind, id: impl Into<EntityId>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns true for failures a caller may reasonably retry by resubmitting.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Storage(_))
    }
}

// == Conversions ==
// reqwest and serde_json errors are not Clone, so they are flattened to their
// message at the conversion boundary.
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the entity store.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::not_found(EntityKind::Property, "P1");
        assert_eq!(err.to_string(), "property not found: P1");
    }

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Remote("timeout".into()).is_transient());
        assert!(StoreError::Storage("disk".into()).is_transient());
        assert!(!StoreError::not_found(EntityKind::Client, "C1").is_transient());
    }

    #[test]
    fn test_serde_error_flattens_to_payload() {
        let bad = serde_json::from_str::<serde_json::Value>("{nope");
        let err: StoreError = bad.unwrap_err().into();
        assert!(matches!(err, StoreError::Payload(_)));
    }
}
