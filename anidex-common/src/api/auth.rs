//! API authentication via signed bearer tokens
//!
//! # Token format
//!
//! - HS256 JSON Web Token signed with the service salt
//! - Claims: `username` and `exp` (Unix seconds)
//! - Sent in the `Authorization` header, with or without a `Bearer ` prefix
//!
//! Token issuance belongs to the login collaborator; services only consume the
//! pass/fail result of [`verify_token`]. [`issue_token`] produces tokens in the
//! same format for operators and tests.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies here; middleware lives in the service crates.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned when a protected request carries no `Authorization` header
pub const MISSING_AUTH_HEADER: &str = "Authorization header is missing";

/// Lifetime of tokens issued by the login flow
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiAuthError {
    /// No `Authorization` header on the request
    #[error("{}", MISSING_AUTH_HEADER)]
    MissingHeader,

    /// Token signature or structure rejected
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token was valid once but `exp` has passed
    #[error("Token is expired")]
    Expired,

    /// Token could not be produced
    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub exp: i64,
}

/// Sign a token for `username` valid for `ttl`
pub fn issue_token(username: &str, salt: &str, ttl: Duration) -> Result<String, ApiAuthError> {
    let claims = Claims {
        username: username.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(salt.as_bytes()),
    )
    .map_err(|e| ApiAuthError::Signing(e.to_string()))
}

/// Verify the raw `Authorization` header value against `salt`
///
/// # Examples
///
/// ```
/// use anidex_common::api::auth::{issue_token, verify_token};
///
/// let token = issue_token("curator", "pepper", chrono::Duration::hours(1)).unwrap();
/// let claims = verify_token(&format!("Bearer {}", token), "pepper").unwrap();
/// assert_eq!(claims.username, "curator");
///
/// assert!(verify_token(&token, "other-salt").is_err());
/// ```
pub fn verify_token(header_value: &str, salt: &str) -> Result<Claims, ApiAuthError> {
    let token = header_value.trim_start();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
    if token.is_empty() {
        return Err(ApiAuthError::MissingHeader);
    }

    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(salt.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiAuthError::Expired,
            _ => ApiAuthError::InvalidToken(e.to_string()),
        })
}
