//! `Authorization: Bearer <token>` extractor.

use axum::extract::FromRequestParts;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use lms_domain::user::UserRole;

use crate::token::{AuthError, validate_session_token};

/// Implemented by router state so the extractor can reach the signing secret.
pub trait SessionSecret {
    fn session_secret(&self) -> &str;
}

/// Caller identity taken from the signed token claims.
///
/// Returns 401 if the header is absent, not a bearer credential, or fails validation.
/// Role and ownership checks (403) are done after extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerIdentity {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityRejection {
    #[error("missing bearer token")]
    Missing,
    #[error(transparent)]
    Invalid(#[from] AuthError),
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "rejected bearer token");
        let body = serde_json::json!({
            "kind": "INVALID_TOKEN",
            "message": "invalid token",
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for BearerIdentity
where
    S: SessionSecret + Send + Sync,
{
    type Rejection = IdentityRejection;

    // Validation is synchronous, so resolve before the future to avoid capturing `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(IdentityRejection::Missing)
            .and_then(|auth| {
                validate_session_token(auth.token(), state.session_secret())
                    .map_err(IdentityRejection::from)
            })
            .map(|info| Self {
                user_id: info.user_id,
                role: info.role,
            });

        async move { result }
    }
}
