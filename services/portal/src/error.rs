use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Why a one-time code was refused. Logged, never shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    NotFound,
    Expired,
    AlreadyConsumed,
}

/// Portal service error variants.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired code")]
    InvalidCode(CodeRejection),
    #[error("one-time code required for this account")]
    SecondFactorRequired,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error("assignment not found")]
    AssignmentNotFound,
    #[error("material not found")]
    MaterialNotFound,
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("invitation not found")]
    InvitationNotFound,
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("assignment already submitted")]
    AlreadySubmitted,
    #[error("already enrolled")]
    AlreadyEnrolled,
    #[error("course is full")]
    CourseFull,
    #[error("invitation is no longer valid")]
    InvalidInvitation,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PortalError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCode(_) => "INVALID_OR_EXPIRED_CODE",
            Self::SecondFactorRequired => "OTP_REQUIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            Self::MaterialNotFound => "MATERIAL_NOT_FOUND",
            Self::SubmissionNotFound => "SUBMISSION_NOT_FOUND",
            Self::InvitationNotFound => "INVITATION_NOT_FOUND",
            Self::EnrollmentNotFound => "ENROLLMENT_NOT_FOUND",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::AlreadySubmitted => "ALREADY_SUBMITTED",
            Self::AlreadyEnrolled => "ALREADY_ENROLLED",
            Self::CourseFull => "COURSE_FULL",
            Self::InvalidInvitation => "INVALID_INVITATION",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidCode(_) => StatusCode::UNAUTHORIZED,
            Self::SecondFactorRequired | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::CourseNotFound
            | Self::AssignmentNotFound
            | Self::MaterialNotFound
            | Self::SubmissionNotFound
            | Self::InvitationNotFound
            | Self::EnrollmentNotFound => StatusCode::NOT_FOUND,
            Self::EmailAlreadyRegistered
            | Self::AlreadySubmitted
            | Self::AlreadyEnrolled
            | Self::CourseFull => StatusCode::CONFLICT,
            Self::InvalidInvitation | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        // 4xx are expected client outcomes; TraceLayer already records them.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
