//! HS256 bearer-token verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a raw bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// Shared-secret (HS256) validator.
///
/// Expiry is checked against our own `issued_at`/`expires_at` claims rather
/// than the registered `exp` claim.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use yatube_blog::Username;

    fn mint(secret: &str, issued_at: DateTime<Utc>, ttl: Duration) -> String {
        let claims = JwtClaims {
            sub: Username::parse("alice").unwrap(),
            issued_at,
            expires_at: issued_at + ttl,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn round_trips_a_valid_token() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        let claims = validator
            .validate(&mint("secret", now, Duration::minutes(5)), now)
            .unwrap();
        assert_eq!(claims.sub.as_str(), "alice");
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        let err = validator
            .validate(&mint("other", now, Duration::minutes(5)), now)
            .unwrap_err();
        assert!(matches!(err, JwtError::Decode(_)));
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        let token = mint("secret", now - Duration::hours(1), Duration::minutes(5));
        assert!(matches!(
            validator.validate(&token, now),
            Err(JwtError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn rejects_garbage() {
        let validator = Hs256JwtValidator::new(b"secret".to_vec());
        assert!(validator.validate("not.a.jwt", Utc::now()).is_err());
    }
}
