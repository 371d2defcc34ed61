//! Access and refresh tokens for studio staff.
//!
//! An access token names the user, their role and the production department
//! that role works in, so permission checks need no database round trip.
//! Tokens are rejected when the department claim disagrees with the role.
//! Refresh tokens are opaque; `user_sessions` keeps only their SHA-256 hash.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use studio_core::department::Department;
use studio_core::roles::ALL_ROLES;
use studio_core::types::DbId;
use uuid::Uuid;

/// `iss` claim on every access token this server signs.
pub const TOKEN_ISSUER: &str = "studio-api";

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: DbId,
    pub role: String,
    /// Pipeline department of `role`; absent for producers, HR and the like.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept: Option<Department>,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("JWT_SECRET must be at least {min} characters", min = MIN_SECRET_LEN)]
    WeakSecret,
    #[error("{name} must be a positive whole number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

fn positive_env(name: &'static str, default: i64) -> Result<i64, JwtConfigError> {
    let Ok(value) = std::env::var(name) else {
        return Ok(default);
    };
    match value.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(JwtConfigError::InvalidNumber { name, value }),
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 15)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    pub fn from_env() -> Result<Self, JwtConfigError> {
        let secret =
            std::env::var("JWT_SECRET").map_err(|_| JwtConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::WeakSecret);
        }
        Ok(Self {
            secret,
            access_token_expiry_mins: positive_env("JWT_ACCESS_EXPIRY_MINS", 15)?,
            refresh_token_expiry_days: positive_env("JWT_REFRESH_EXPIRY_DAYS", 7)?,
        })
    }
}

/// Sign an access token for `user_id` acting as `role`.
pub fn sign_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        dept: Department::for_role(role),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, then check the role claims hang
/// together.
pub fn decode_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?
    .claims;

    if !ALL_ROLES.contains(&claims.role.as_str())
        || claims.dept != Department::for_role(&claims.role)
    {
        return Err(ErrorKind::InvalidToken.into());
    }
    Ok(claims)
}

/// A freshly minted refresh token. Hand `plaintext` to the client and
/// store `hash`.
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let hash = hash_refresh_token(&plaintext);
        Self { plaintext, hash }
    }
}

pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
