//! Basic-auth check for the publish route.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Why a publish request failed authentication. The HTTP mapping lives
/// with the handlers: malformed input is 400, wrong credentials 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("unsupported authorization scheme (expected Basic)")]
    MalformedScheme,

    #[error("malformed basic credentials")]
    MalformedCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Check `Authorization: Basic admin:<token>` against the configured
/// token.
pub fn check_authorization(headers: &HeaderMap, expected_token: &str) -> Result<(), AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedScheme)?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or(AuthError::MalformedScheme)?;

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;
    let (user, token) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;

    if user != "admin" || !timing_safe_eq(token.as_bytes(), expected_token.as_bytes()) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(())
}

/// Constant-time equality over fixed-width SHA-256 digests, so neither
/// the secret's length nor its matching prefix shapes the comparison.
fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    let a = Sha256::digest(a);
    let b = Sha256::digest(b);
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
