use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_auth_types::identity::BearerIdentity;
use lms_domain::invitation::InvitationStatus;

use crate::domain::access::Actor;
use crate::error::PortalError;
use crate::handlers::auth::SessionResponse;
use crate::state::AppState;
use crate::usecase::invitation::{
    AcceptInvitationInput, AcceptInvitationUseCase, InviteTeacherUseCase,
    SetTeacherActiveUseCase,
};

// ── POST /admin/invitations ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InviteTeacherRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub email: String,
    pub status: InvitationStatus,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub delivered: bool,
}

pub async fn invite_teacher(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Json(body): Json<InviteTeacherRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), PortalError> {
    let usecase = InviteTeacherUseCase {
        users: state.user_repo(),
        invitations: state.invitation_repo(),
        mailer: state.mailer(),
        public_url: state.public_url.clone(),
    };
    let outcome = usecase
        .execute(&Actor::from(identity), &body.email)
        .await?;
    let invitation = outcome.invitation;
    Ok((
        StatusCode::CREATED,
        Json(InvitationResponse {
            id: invitation.id.to_string(),
            email: invitation.email,
            status: invitation.status,
            expires_at: invitation.expires_at,
            delivered: outcome.delivered,
        }),
    ))
}

// ── POST /invitations/accept ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AcceptInvitationRequest {
    pub token: String,
    pub name: String,
    pub password: String,
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(body): Json<AcceptInvitationRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), PortalError> {
    let usecase = AcceptInvitationUseCase {
        users: state.user_repo(),
        invitations: state.invitation_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let session = usecase
        .execute(AcceptInvitationInput {
            token: body.token,
            name: body.name,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── PATCH /admin/teachers/{id}/active ────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub async fn set_teacher_active(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(teacher_id): Path<Uuid>,
    Json(body): Json<SetActiveRequest>,
) -> Result<StatusCode, PortalError> {
    let usecase = SetTeacherActiveUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(&Actor::from(identity), teacher_id, body.active)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
