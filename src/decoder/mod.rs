//! Decoding of packed on-chain property accounts.
//!
//! The account layout is defined by the on-chain program and carries no version tag, so every
//! variable-length field is bounds-checked before it is consumed. Decoding is pure: bytes in,
//! record or error out.

/// Bounds-checked byte reader
mod cursor;
/// Property account layout and the decoded domain record
mod property;

#[cfg(test)]
pub mod fixtures;

pub use cursor::ByteCursor;
pub use property::*;

/// Reasons an account buffer is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	#[error("Invalid data size: expected at least {expected} bytes, got {actual}")]
	InvalidSize { expected: usize, actual: usize },

	#[error(
		"Field `{field}` out of bounds: {len} bytes requested at offset {offset}, \
		 {available} available"
	)]
	FieldOutOfBounds {
		field: &'static str,
		offset: usize,
		len: usize,
		available: usize,
	},

	#[error("Discriminator mismatch: expected {expected}, found {found}")]
	DiscriminatorMismatch { expected: String, found: String },
}
