//! Errors surfaced by the signing authority.

use thiserror::Error;

/// Result alias for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Errors produced while generating keys, minting, or verifying tokens.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Key-pair generation or PEM encoding failed. Fatal at startup; there
    /// is no fallback.
    #[error("failed to generate signing key pair: {0}")]
    KeyGeneration(String),
    /// Token minting failed.
    #[error("failed to sign session token: {0}")]
    Mint(#[from] jsonwebtoken::errors::Error),
    /// Token verification failed (bad signature, expired, or malformed).
    #[error("session token verification failed: {0}")]
    Verification(String),
}
