//! RSA-backed RS256 session-token signing and offline verification.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use coordinator_primitives::{AgentId, ClientId};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::RsaPrivateKey;
use tracing::info;
use uuid::Uuid;

use crate::claims::{SessionTokenClaims, ISSUER};
use crate::error::{SigningError, SigningResult};

const KEY_BITS: usize = 2048;

/// Everything an agent or client needs to verify tokens offline.
#[derive(Debug, Clone)]
pub struct PublicKeyInfo {
    /// PEM-encoded SubjectPublicKeyInfo.
    pub pem: String,
    /// Signature algorithm name, always `"RS256"`.
    pub algorithm: &'static str,
    /// Fixed issuer identifier, always `"coordinator"`.
    pub issuer: &'static str,
}

/// Generates an RSA key pair at construction and mints/verifies RS256
/// session tokens against it for the lifetime of the process.
///
/// Rotation is out of scope: one key pair lives as long as the process.
pub struct SigningAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_key_pem: String,
    token_ttl: Duration,
}

impl std::fmt::Debug for SigningAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningAuthority")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl SigningAuthority {
    /// Generates a fresh 2048-bit RSA key pair and builds a signing
    /// authority around it. Failure here is fatal at startup.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::KeyGeneration`] if key generation or PEM
    /// encoding fails.
    pub fn generate(token_ttl: Duration) -> SigningResult<Self> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|err| SigningError::KeyGeneration(err.to_string()))?;
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs1_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|err| SigningError::KeyGeneration(err.to_string()))?;
        let public_pem = public_key
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|err| SigningError::KeyGeneration(err.to_string()))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|err| SigningError::KeyGeneration(err.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|err| SigningError::KeyGeneration(err.to_string()))?;

        info!(bits = KEY_BITS, "generated coordinator signing key pair");

        Ok(Self {
            encoding_key,
            decoding_key,
            public_key_pem: public_pem,
            token_ttl,
        })
    }

    /// Mints a signed session token binding `client_id` to `agent_id` for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Mint`] if the claims cannot be encoded or signed.
    pub fn mint(
        &self,
        agent_id: AgentId,
        client_id: ClientId,
        model: String,
    ) -> SigningResult<(String, SessionTokenClaims)> {
        let now = current_unix_seconds();
        let claims = SessionTokenClaims {
            jti: Uuid::new_v4().to_string(),
            iss: ISSUER.to_string(),
            iat: now,
            nbf: now,
            exp: now + i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX),
            agent_id,
            client_id,
            model,
        };

        let header = Header::new(Algorithm::RS256);
        let token = encode(&header, &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Verifies a token's signature and time window without any network call.
    ///
    /// This is the same verification path the coordinator uses internally
    /// for its own tests; it is exposed so agents and an eventual SDK can
    /// reuse it instead of reimplementing RS256 validation against the
    /// published public key.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Verification`] if the signature is invalid,
    /// the token is expired/not-yet-valid, or the token is malformed.
    pub fn verify(&self, token: &str) -> SigningResult<SessionTokenClaims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[ISSUER]);
        let data = decode::<SessionTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|err| SigningError::Verification(err.to_string()))?;
        Ok(data.claims)
    }

    /// Returns the PEM-encoded verification key plus algorithm and issuer,
    /// for `GetPublicKey`.
    #[must_use]
    pub fn public_key_info(&self) -> PublicKeyInfo {
        PublicKeyInfo {
            pem: self.public_key_pem.clone(),
            algorithm: "RS256",
            issuer: ISSUER,
        }
    }
}

fn current_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
