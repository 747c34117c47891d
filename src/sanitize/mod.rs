//! Sanitization Module
//!
//! Cleans outgoing write payloads of "not provided" values and validates the
//! result against a field schema. Every create/update form submission passes
//! through this module before it reaches a cache operation.

mod empty;
mod resolver;
mod strip;


// Re-export public types
pub use empty::is_empty;
pub use resolver::{FieldSpec, FieldType, Resolver, Schema, ValidationErrors, ValidationIssue};
pub use strip::{strip, strip_value};
