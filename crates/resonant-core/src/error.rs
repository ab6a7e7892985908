//! Error types for record definition.
//!
//! Definition mistakes (empty or duplicate property names) are the only
//! fallible part of the public surface; they are reported when a record
//! is built. Runtime misuse of an already-built record, such as resolving
//! through a torn-down context, is logged and ignored instead of being
//! turned into a hard failure.

/// Validation errors raised while building a record definition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
	#[error("Property name cannot be empty")]
	EmptyName,

	#[error("Property '{0}' is defined more than once")]
	DuplicateProperty(String),
}
