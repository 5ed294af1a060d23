use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use depot_core::UserId;

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims Depot expects once a token has been
/// decoded/verified. `name` is the display name stamped onto records as
/// `created_by`/`updated_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Display name of the authenticated user.
    pub name: String,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiration, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: UserId, name: impl Into<String>, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub,
            name: name.into(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// lives in [`crate::token`].
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(issued: DateTime<Utc>) -> Claims {
        Claims::new(UserId::new(), "tester", issued, Duration::minutes(10))
    }

    #[test]
    fn accepts_token_inside_window() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims_at(now), now + Duration::minutes(5)), Ok(()));
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims_at(now), now + Duration::minutes(11)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn rejects_token_from_the_future() {
        let now = Utc::now();
        assert_eq!(
            validate_claims(&claims_at(now + Duration::minutes(2)), now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let claims = Claims::new(UserId::new(), "tester", now, Duration::minutes(-1));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
