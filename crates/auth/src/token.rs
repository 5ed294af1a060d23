//! HS256 token encode/decode over the shared secret.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, Claims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token verification failed: {0}")]
    Verification(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Symmetric HS256 codec for bearer tokens.
///
/// One instance is built at startup from `JWT_SECRET` and shared across
/// requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is re-checked deterministically in validate_claims.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &self.encoding,
        )?)
    }

    /// Verify the signature and the claim time window.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        validate_claims(&data.claims, Utc::now())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use depot_core::UserId;

    #[test]
    fn encode_decode_round_trip() {
        let codec = TokenCodec::new(b"test-secret");
        let claims = Claims::new(UserId::new(), "Ava", Utc::now(), Duration::minutes(10));
        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let codec = TokenCodec::new(b"secret-a");
        let other = TokenCodec::new(b"secret-b");
        let claims = Claims::new(UserId::new(), "Ava", Utc::now(), Duration::minutes(10));
        let token = codec.encode(&claims).unwrap();
        assert!(matches!(other.decode(&token), Err(TokenError::Verification(_))));
    }

    #[test]
    fn decode_rejects_tampered_token() {
        let codec = TokenCodec::new(b"test-secret");
        let claims = Claims::new(UserId::new(), "Ava", Utc::now(), Duration::minutes(10));
        let mut token = codec.encode(&claims).unwrap();
        token.push('x');
        assert!(codec.decode(&token).is_err());
    }
}
