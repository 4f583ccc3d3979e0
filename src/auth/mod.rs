use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an admin token. There is a single shared admin
/// identity, so sub and role are fixed values.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn admin(expiry_hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: ADMIN_ROLE.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token, authorization denied")]
    MissingToken,

    #[error("Token is not valid")]
    InvalidToken,

    #[error("JWT secret not configured")]
    SecretMissing,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}

/// Exchange the shared admin credential pair for a signed bearer token.
/// Any mismatch yields the same error; callers never learn which field
/// was wrong.
pub fn login(username: &str, password: &str) -> Result<String, AuthError> {
    let security = &config::config().security;

    let matches = !security.admin_username.is_empty()
        && !security.admin_password.is_empty()
        && username == security.admin_username
        && password == security.admin_password;

    if !matches {
        return Err(AuthError::InvalidCredentials);
    }

    generate_admin_token()
}

/// Issue a token for the fixed admin identity, expiring per config.
pub fn generate_admin_token() -> Result<String, AuthError> {
    let security = &config::config().security;
    encode_token(&Claims::admin(security.jwt_expiry_hours), &security.jwt_secret)
}

/// Validate signature and expiry and hand back the claims. Fails, never
/// panics, on missing/malformed/expired/tampered tokens.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    decode_token(token, &config::config().security.jwt_secret)
}

fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretMissing);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretMissing);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|_| AuthError::InvalidToken)?;

    if token_data.claims.role != ADMIN_ROLE {
        return Err(AuthError::InvalidToken);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trips_within_expiry() {
        let token = encode_token(&Claims::admin(24), SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: ADMIN_ROLE.to_string(),
            role: ADMIN_ROLE.to_string(),
            // Well past the default validation leeway
            exp: (now - Duration::hours(25)).timestamp(),
            iat: (now - Duration::hours(49)).timestamp(),
        };
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode_token(&Claims::admin(24), "other-secret").unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = encode_token(&Claims::admin(24), SECRET).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(decode_token(&tampered, SECRET), Err(AuthError::InvalidToken)));
        assert!(matches!(decode_token("not.a.jwt", SECRET), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn empty_secret_is_refused_outright() {
        assert!(matches!(
            encode_token(&Claims::admin(24), ""),
            Err(AuthError::SecretMissing)
        ));
    }

    #[test]
    fn non_admin_role_claim_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "viewer".to_string(),
            role: "viewer".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AuthError::InvalidToken)));
    }
}
