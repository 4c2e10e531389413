//! Shared error definitions for coordinator primitives.

use thiserror::Error;

/// Result alias used throughout the primitives crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An identifier supplied by a caller was empty or otherwise malformed.
    #[error("invalid {kind} id: {reason}")]
    InvalidId {
        /// Which identifier kind failed validation (`"agent"`, `"client"`, ...).
        kind: &'static str,
        /// Human-readable reason for rejection.
        reason: &'static str,
    },
}
