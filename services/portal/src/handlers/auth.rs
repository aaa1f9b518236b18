use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use lms_auth_types::identity::BearerIdentity;
use lms_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::login::{
    CheckRoleUseCase, CompleteRegistrationInput, CompleteRegistrationUseCase, CredentialsInput,
    GetProfileUseCase, PasswordLoginUseCase, RequestLoginCodeUseCase,
    RequestRegistrationCodeUseCase, Session, VerifyCodeInput, VerifyLoginCodeUseCase,
};
use crate::usecase::otp::IssueOutcome;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl From<CredentialsRequest> for CredentialsInput {
    fn from(body: CredentialsRequest) -> Self {
        Self {
            email: body.email,
            password: body.password,
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    /// Seconds since epoch.
    pub expires_at: u64,
    pub user: UserResponse,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user: session.user.into(),
        }
    }
}

/// Body of the code-issuing endpoints. `delivered: false` means the code exists
/// but the mail may not have been sent.
#[derive(Serialize)]
pub struct CodeIssuedResponse {
    pub delivered: bool,
}

impl From<IssueOutcome> for CodeIssuedResponse {
    fn from(outcome: IssueOutcome) -> Self {
        Self {
            delivered: outcome.delivered,
        }
    }
}

// ── POST /auth/check-role ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: UserRole,
    pub requires_otp: bool,
}

pub async fn check_role(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<RoleResponse>, PortalError> {
    let usecase = CheckRoleUseCase {
        users: state.user_repo(),
    };
    let role = usecase.execute(body.into()).await?;
    Ok(Json(RoleResponse {
        role,
        requires_otp: role.requires_second_factor(),
    }))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, PortalError> {
    let usecase = PasswordLoginUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let session = usecase.execute(body.into()).await?;
    Ok(Json(session.into()))
}

// ── POST /auth/send-otp ──────────────────────────────────────────────────────

pub async fn send_login_code(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<CodeIssuedResponse>), PortalError> {
    let usecase = RequestLoginCodeUseCase {
        users: state.user_repo(),
        otp: state.otp_service(),
    };
    let outcome = usecase.execute(body.into()).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome.into())))
}

// ── POST /auth/verify-otp ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_login_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<SessionResponse>, PortalError> {
    let usecase = VerifyLoginCodeUseCase {
        users: state.user_repo(),
        otp: state.otp_service(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let session = usecase
        .execute(VerifyCodeInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(session.into()))
}

// ── POST /auth/register/send-otp ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegistrationCodeRequest {
    pub email: String,
}

pub async fn send_registration_code(
    State(state): State<AppState>,
    Json(body): Json<RegistrationCodeRequest>,
) -> Result<(StatusCode, Json<CodeIssuedResponse>), PortalError> {
    let usecase = RequestRegistrationCodeUseCase {
        users: state.user_repo(),
        otp: state.otp_service(),
    };
    let outcome = usecase.execute(&body.email).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome.into())))
}

// ── POST /auth/register/verify-otp ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CompleteRegistrationRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub code: String,
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn complete_registration(
    State(state): State<AppState>,
    Json(body): Json<CompleteRegistrationRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), PortalError> {
    let usecase = CompleteRegistrationUseCase {
        users: state.user_repo(),
        otp: state.otp_service(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let session = usecase
        .execute(CompleteRegistrationInput {
            email: body.email,
            name: body.name,
            password: body.password,
            code: body.code,
            requested_role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── GET /auth/profile ────────────────────────────────────────────────────────

pub async fn profile(
    identity: BearerIdentity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, PortalError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(user.into()))
}
