//! Session tokens: signed, self-contained, never stored server-side.
//!
//! Validity is a function of the signature and `exp` only. There is no
//! revocation list; logout is the client discarding the token.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_domain::user::UserRole;

/// Session-token lifetime in seconds (24 hours). No refresh mechanism exists.
pub const SESSION_TOKEN_EXP: u64 = 86_400;

/// Identity extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: UserRole,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// A freshly signed token together with its expiry (seconds since epoch).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// JWT claims payload.
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `sub` | `sub` | UUID string | user ID |
/// | `role` | custom | [`UserRole`] | lowercase role name |
/// | `iat` | `iat` | seconds since epoch | issue time |
/// | `exp` | `exp` | seconds since epoch | expiry |
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: UserRole,
    pub iat: u64,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign a session token for `user_id` valid for [`SESSION_TOKEN_EXP`] seconds from now.
pub fn issue_session_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
) -> Result<IssuedToken, AuthError> {
    issue_session_token_at(user_id, role, secret, now_secs())
}

/// Same as [`issue_session_token`] with an explicit issue time.
pub fn issue_session_token_at(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    issued_at: u64,
) -> Result<IssuedToken, AuthError> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        role,
        iat: issued_at,
        exp: issued_at + SESSION_TOKEN_EXP,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AuthError::Signing)?;
    Ok(IssuedToken {
        token,
        expires_at: claims.exp,
    })
}

/// Decode and validate a session token.
///
/// Validation: HS256, exp checked with the default 60s leeway, required claims `exp` + `sub`.
/// No store lookup is involved.
pub fn validate_session_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    let claims = data.claims;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        role: claims.role,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}
