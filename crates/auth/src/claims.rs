use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use facturas_core::CompanyId;

use crate::{PrincipalId, Role};

/// JWT claims model (transport-agnostic).
///
/// A token binds its subject to exactly one company; every domain request is
/// scoped to that company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// The company the principal acts for.
    pub company_id: CompanyId,

    /// Roles granted within that company.
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed or unsigned token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Checks the time window only; see [`crate::jwt`] for signature checks.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            company_id: CompanyId::new(),
            roles: vec![Role::new("user")],
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn accepts_token_inside_its_window() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1), Duration::minutes(10));
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn rejects_expired_future_and_inverted_windows() {
        let now = Utc::now();
        let expired = claims(now - Duration::minutes(20), Duration::minutes(10));
        assert_eq!(validate_claims(&expired, now), Err(TokenValidationError::Expired));

        let future = claims(now + Duration::minutes(5), Duration::minutes(10));
        assert_eq!(validate_claims(&future, now), Err(TokenValidationError::NotYetValid));

        let inverted = claims(now, Duration::zero());
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
