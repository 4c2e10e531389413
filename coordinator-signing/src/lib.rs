//! RS256 session-token signing authority.
//!
//! Generates one RSA key pair per process lifetime, mints tokens bound to a
//! selected agent and requesting client, and verifies them offline against
//! the same key — the verification path `GetPublicKey` callers are expected
//! to reimplement, exposed directly so nothing reimplements it differently.

#![warn(missing_docs, clippy::pedantic)]

mod authority;
mod claims;
mod error;

pub use authority::{PublicKeyInfo, SigningAuthority};
pub use claims::{SessionTokenClaims, ISSUER};
pub use error::{SigningError, SigningResult};
