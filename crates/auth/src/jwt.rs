//! Bearer token verification.
//!
//! Tokens are issued elsewhere; this module only decodes, verifies the HS256
//! signature and then applies [`validate_claims`].

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Turns a raw bearer token into trusted claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Shared-secret (HS256) validator.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window lives in `issued_at`/`expires_at`, not in registered claims.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            TokenValidationError::Malformed(e.to_string())
        })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use facturas_core::CompanyId;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use crate::{PrincipalId, Role};

    fn mint(secret: &str, claims: &JwtClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            company_id: CompanyId::new(),
            roles: vec![Role::new("admin")],
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn round_trips_a_signed_token() {
        let now = Utc::now();
        let expected = claims(now);
        let validator = Hs256JwtValidator::new("s3cret");
        let decoded = validator.validate(&mint("s3cret", &expected), now).unwrap();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("s3cret");
        let forged = mint("other", &claims(now));
        assert!(matches!(
            validator.validate(&forged, now),
            Err(TokenValidationError::Malformed(_))
        ));
        assert!(validator.validate("not-a-jwt", now).is_err());
    }

    #[test]
    fn applies_the_claim_time_window() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new("s3cret");
        let token = mint("s3cret", &claims(now));
        assert_eq!(
            validator.validate(&token, now + Duration::hours(1)),
            Err(TokenValidationError::Expired)
        );
    }
}
