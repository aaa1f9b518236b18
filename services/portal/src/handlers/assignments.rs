use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_auth_types::identity::BearerIdentity;
use lms_domain::submission::SubmissionStatus;

use crate::domain::access::Actor;
use crate::domain::types::{Assignment, Submission};
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::assignment::{
    CreateAssignmentInput, CreateAssignmentUseCase, ListAssignmentsUseCase,
};
use crate::usecase::submission::{
    GradeInput, GradeSubmissionUseCase, ListSubmissionsUseCase, SubmitAssignmentUseCase,
};

#[derive(Serialize)]
pub struct AssignmentResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub due_at: chrono::DateTime<chrono::Utc>,
    pub points: u32,
}

impl From<Assignment> for AssignmentResponse {
    fn from(a: Assignment) -> Self {
        Self {
            id: a.id.to_string(),
            course_id: a.course_id.to_string(),
            title: a.title,
            description: a.description,
            due_at: a.due_at,
            points: a.points,
        }
    }
}

#[derive(Serialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub assignment_id: String,
    pub student_id: String,
    pub content: String,
    pub status: SubmissionStatus,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms_opt")]
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id.to_string(),
            assignment_id: s.assignment_id.to_string(),
            student_id: s.student_id.to_string(),
            content: s.content,
            status: s.status,
            grade: s.grade,
            feedback: s.feedback,
            submitted_at: s.submitted_at,
            graded_at: s.graded_at,
        }
    }
}

// ── GET /courses/{id}/assignments ────────────────────────────────────────────

pub async fn list_assignments(
    _identity: BearerIdentity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentResponse>>, PortalError> {
    let usecase = ListAssignmentsUseCase {
        courses: state.course_repo(),
        assignments: state.assignment_repo(),
    };
    let assignments = usecase.execute(course_id).await?;
    Ok(Json(assignments.into_iter().map(Into::into).collect()))
}

// ── POST /courses/{id}/assignments ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_at: chrono::DateTime<chrono::Utc>,
    pub points: u32,
}

pub async fn create_assignment(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), PortalError> {
    let usecase = CreateAssignmentUseCase {
        courses: state.course_repo(),
        assignments: state.assignment_repo(),
    };
    let assignment = usecase
        .execute(
            &Actor::from(identity),
            course_id,
            CreateAssignmentInput {
                title: body.title,
                description: body.description,
                due_at: body.due_at,
                points: body.points,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(assignment.into())))
}

// ── POST /assignments/{id}/submit ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

pub async fn submit_assignment(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), PortalError> {
    let usecase = SubmitAssignmentUseCase {
        assignments: state.assignment_repo(),
        enrollments: state.enrollment_repo(),
        submissions: state.submission_repo(),
    };
    let submission = usecase
        .execute(&Actor::from(identity), assignment_id, body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(submission.into())))
}

// ── GET /assignments/{id}/submissions ────────────────────────────────────────

pub async fn list_submissions(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<Vec<SubmissionResponse>>, PortalError> {
    let usecase = ListSubmissionsUseCase {
        courses: state.course_repo(),
        assignments: state.assignment_repo(),
        submissions: state.submission_repo(),
    };
    let submissions = usecase
        .execute(&Actor::from(identity), assignment_id)
        .await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

// ── POST /submissions/{id}/grade ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GradeRequest {
    pub grade: f64,
    pub feedback: Option<String>,
}

pub async fn grade_submission(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
    Json(body): Json<GradeRequest>,
) -> Result<Json<SubmissionResponse>, PortalError> {
    let usecase = GradeSubmissionUseCase {
        courses: state.course_repo(),
        assignments: state.assignment_repo(),
        submissions: state.submission_repo(),
    };
    let submission = usecase
        .execute(
            &Actor::from(identity),
            submission_id,
            GradeInput {
                grade: body.grade,
                feedback: body.feedback,
            },
        )
        .await?;
    Ok(Json(submission.into()))
}
