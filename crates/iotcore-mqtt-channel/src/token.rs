//! RS256 JWT used as the MQTT password.
//!
//! The bridge checks `aud` against the project and rejects tokens past
//! `exp`. A token is signed fresh for every connection.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Signature algorithm for device keys registered as `RSA_PEM`.
pub const ALGORITHM: Algorithm = Algorithm::RS256;

/// Lifetime of the token signed for each publish cycle.
pub const TOKEN_TTL: Duration = Duration::from_secs(20 * 60);

/// Claim set accepted by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(audience: &str, issued_at: DateTime<Utc>, validity: Duration) -> Self {
        let iat = issued_at.timestamp();
        let ttl = i64::try_from(validity.as_secs()).unwrap_or(i64::MAX);
        Self {
            aud: audience.to_string(),
            iat,
            exp: iat.saturating_add(ttl),
        }
    }
}

/// Sign a token for `audience` using PEM-encoded RSA key bytes.
pub fn sign_with_key(
    audience: &str,
    key_pem: &[u8],
    validity: Duration,
    now: DateTime<Utc>,
) -> Result<String, TokenError> {
    let claims = Claims::new(audience, now, validity);
    tracing::debug!(
        aud = %claims.aud,
        iat = claims.iat,
        exp = claims.exp,
        "signing device token"
    );

    let key = EncodingKey::from_rsa_pem(key_pem)
        .map_err(|e| TokenError::KeyParse(e.to_string()))?;

    jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &key)
        .map_err(|e| TokenError::Sign(e.to_string()))
}

/// Read the private key at `private_key_path` and sign a token valid for
/// `validity` from now.
pub fn sign_token(
    audience: &str,
    private_key_path: &str,
    validity: Duration,
) -> Result<String, TokenError> {
    let key_pem = std::fs::read(private_key_path).map_err(|source| TokenError::KeyRead {
        path: private_key_path.to_string(),
        source,
    })?;

    sign_with_key(audience, &key_pem, validity, Utc::now())
}
