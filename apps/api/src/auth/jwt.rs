//! Bearer-token validation.
//!
//! The hosted identity provider signs session tokens with a shared secret
//! (HS256). Claims carry the subject id and the user's role; everything else
//! about the user lives in the `users` table.

use std::str::FromStr;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::permissions::Role;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct RawClaims {
    /// Subject: the user id as a UUID string.
    sub: String,
    role: String,
    #[allow(dead_code)]
    exp: u64,
}

/// Validated claims extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct ValidatedClaims {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<ValidatedClaims, TokenError> {
        let token_data = decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Invalid(e.to_string()),
            })?;

        let claims = token_data.claims;

        let user_id = Uuid::from_str(&claims.sub)
            .map_err(|_| TokenError::Invalid("sub is not a UUID".to_string()))?;
        let role = Role::from_str(&claims.role).map_err(TokenError::Invalid)?;

        Ok(ValidatedClaims { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        role: String,
        exp: u64,
    }

    fn make_token(secret: &str, sub: &str, role: &str, exp_offset_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as u64;
        encode(
            &Header::new(Algorithm::HS256),
            &TestClaims {
                sub: sub.to_string(),
                role: role.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_claims() {
        let verifier = JwtVerifier::new(SECRET);
        let sub = "550e8400-e29b-41d4-a716-446655440000";
        let token = make_token(SECRET, sub, "recruiter", 3600);

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.user_id.to_string(), sub);
        assert_eq!(claims.role, Role::Recruiter);
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let token = make_token(
            SECRET,
            "550e8400-e29b-41d4-a716-446655440000",
            "admin",
            -3600,
        );

        assert!(matches!(verifier.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let token = make_token(
            "other-secret",
            "550e8400-e29b-41d4-a716-446655440000",
            "admin",
            3600,
        );

        assert!(matches!(
            verifier.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let token = make_token(
            SECRET,
            "550e8400-e29b-41d4-a716-446655440000",
            "superuser",
            3600,
        );

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let verifier = JwtVerifier::new(SECRET);
        let token = make_token(SECRET, "user-42", "viewer", 3600);

        assert!(verifier.verify(&token).is_err());
    }
}
