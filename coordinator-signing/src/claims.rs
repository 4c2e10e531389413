//! Session token claims schema.

use coordinator_primitives::{AgentId, ClientId};
use serde::{Deserialize, Serialize};

/// The issuer string stamped into every minted token.
pub const ISSUER: &str = "coordinator";

/// Claims carried by a minted session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokenClaims {
    /// Unique token id.
    pub jti: String,
    /// Fixed issuer identifier.
    pub iss: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Not-before, unix seconds (always equal to `iat`).
    pub nbf: i64,
    /// Expires-at, unix seconds (`iat + token_ttl`).
    pub exp: i64,
    /// The agent this token authorizes the client to reach.
    pub agent_id: AgentId,
    /// The client this token was minted for.
    pub client_id: ClientId,
    /// The model the client requested.
    pub model: String,
}
