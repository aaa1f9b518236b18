use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lms_auth_types::identity::BearerIdentity;
use lms_domain::enrollment::EnrollmentStatus;

use crate::domain::access::Actor;
use crate::domain::types::{Course, Enrollment};
use crate::error::PortalError;
use crate::state::AppState;
use crate::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, DeleteCourseUseCase, GetCourseUseCase,
    ListCoursesUseCase, ReassignTeacherUseCase, UpdateCourseInput, UpdateCourseUseCase,
};
use crate::usecase::enrollment::{DropEnrollmentUseCase, EnrollUseCase};

#[derive(Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub teacher_id: String,
    pub capacity: Option<u32>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.to_string(),
            title: course.title,
            description: course.description,
            teacher_id: course.teacher_id.to_string(),
            capacity: course.capacity,
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

// ── GET /courses ─────────────────────────────────────────────────────────────

pub async fn list_courses(
    _identity: BearerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, PortalError> {
    let usecase = ListCoursesUseCase {
        courses: state.course_repo(),
    };
    let courses = usecase.execute().await?;
    Ok(Json(courses.into_iter().map(Into::into).collect()))
}

// ── POST /courses ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub capacity: Option<u32>,
    pub teacher_id: Option<Uuid>,
}

pub async fn create_course(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), PortalError> {
    let usecase = CreateCourseUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(
            &Actor::from(identity),
            CreateCourseInput {
                title: body.title,
                description: body.description,
                capacity: body.capacity,
                teacher_id: body.teacher_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(course.into())))
}

// ── GET /courses/{id} ────────────────────────────────────────────────────────

pub async fn get_course(
    _identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, PortalError> {
    let usecase = GetCourseUseCase {
        courses: state.course_repo(),
    };
    let course = usecase.execute(id).await?;
    Ok(Json(course.into()))
}

// ── PUT|POST /courses/{id} ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "lms_core::serde::nullable")]
    pub description: Option<Option<String>>,
    pub capacity: Option<u32>,
}

pub async fn update_course(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, PortalError> {
    let usecase = UpdateCourseUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    let course = usecase
        .execute(
            &Actor::from(identity),
            id,
            UpdateCourseInput {
                title: body.title,
                description: body.description,
                capacity: body.capacity,
            },
        )
        .await?;
    Ok(Json(course.into()))
}

// ── DELETE /courses/{id} ─────────────────────────────────────────────────────

pub async fn delete_course(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let usecase = DeleteCourseUseCase {
        courses: state.course_repo(),
    };
    usecase.execute(&Actor::from(identity), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /courses/{id}/teacher ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReassignTeacherRequest {
    pub teacher_id: Uuid,
}

pub async fn reassign_teacher(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReassignTeacherRequest>,
) -> Result<Json<CourseResponse>, PortalError> {
    let usecase = ReassignTeacherUseCase {
        users: state.user_repo(),
        courses: state.course_repo(),
    };
    let course = usecase
        .execute(&Actor::from(identity), id, body.teacher_id)
        .await?;
    Ok(Json(course.into()))
}

// ── POST|DELETE /courses/{id}/enroll ─────────────────────────────────────────

#[derive(Serialize)]
pub struct EnrollmentResponse {
    pub id: String,
    pub course_id: String,
    pub student_id: String,
    pub status: EnrollmentStatus,
    #[serde(serialize_with = "lms_core::serde::to_rfc3339_ms")]
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id.to_string(),
            course_id: enrollment.course_id.to_string(),
            student_id: enrollment.student_id.to_string(),
            status: enrollment.status,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

pub async fn enroll(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), PortalError> {
    let usecase = EnrollUseCase {
        courses: state.course_repo(),
        enrollments: state.enrollment_repo(),
    };
    let enrollment = usecase.execute(&Actor::from(identity), id).await?;
    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

pub async fn drop_enrollment(
    identity: BearerIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, PortalError> {
    let usecase = DropEnrollmentUseCase {
        enrollments: state.enrollment_repo(),
    };
    usecase.execute(&Actor::from(identity), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
