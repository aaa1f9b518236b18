use chrono::Utc;
use uuid::Uuid;

use lms_domain::user::UserRole;

use crate::domain::access::{Actor, Operation, ResourceOwners, authorize, check_role};
use crate::domain::repository::{CourseRepository, EnrollmentRepository, UserRepository};
use crate::domain::types::Course;
use crate::error::PortalError;

pub(crate) async fn load_course<C: CourseRepository>(
    courses: &C,
    id: Uuid,
) -> Result<Course, PortalError> {
    courses
        .find_by_id(id)
        .await?
        .ok_or(PortalError::CourseNotFound)
}

/// Role gate, then load, then ownership gate.
pub(crate) async fn load_course_for<C: CourseRepository>(
    courses: &C,
    actor: &Actor,
    op: Operation,
    id: Uuid,
) -> Result<Course, PortalError> {
    check_role(actor, op)?;
    let course = load_course(courses, id).await?;
    authorize(actor, op, Some(&ResourceOwners::course(course.teacher_id)))?;
    Ok(course)
}

async fn require_teacher<U: UserRepository>(users: &U, id: Uuid) -> Result<(), PortalError> {
    match users.find_by_id(id).await? {
        Some(user) if user.role == UserRole::Teacher => Ok(()),
        _ => Err(PortalError::InvalidInput("teacher_id must reference a teacher")),
    }
}

fn validate_title(title: &str) -> Result<String, PortalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PortalError::InvalidInput("title must not be empty"));
    }
    Ok(title.to_owned())
}

fn validate_capacity(capacity: Option<u32>) -> Result<Option<u32>, PortalError> {
    match capacity {
        Some(0) => Err(PortalError::InvalidInput("capacity must be positive")),
        other => Ok(other),
    }
}

// ── CreateCourse ────────────────────────────────────────────────────────────

pub struct CreateCourseInput {
    pub title: String,
    pub description: Option<String>,
    pub capacity: Option<u32>,
    /// Required when an admin creates the course; a teacher always owns what they create.
    pub teacher_id: Option<Uuid>,
}

pub struct CreateCourseUseCase<U: UserRepository, C: CourseRepository> {
    pub users: U,
    pub courses: C,
}

impl<U: UserRepository, C: CourseRepository> CreateCourseUseCase<U, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        input: CreateCourseInput,
    ) -> Result<Course, PortalError> {
        check_role(actor, Operation::CreateCourse)?;

        let teacher_id = match (actor.role, input.teacher_id) {
            (UserRole::Admin, Some(id)) => {
                require_teacher(&self.users, id).await?;
                id
            }
            (UserRole::Admin, None) => {
                return Err(PortalError::InvalidInput("teacher_id is required"));
            }
            (_, Some(id)) if id != actor.user_id => return Err(PortalError::Forbidden),
            _ => actor.user_id,
        };

        let now = Utc::now();
        let course = Course {
            id: Uuid::now_v7(),
            title: validate_title(&input.title)?,
            description: input.description,
            teacher_id,
            capacity: validate_capacity(input.capacity)?,
            created_at: now,
            updated_at: now,
        };
        self.courses.create(&course).await?;
        tracing::info!(course_id = %course.id, teacher_id = %teacher_id, by = %actor.user_id, "course created");
        Ok(course)
    }
}

// ── Read ────────────────────────────────────────────────────────────────────

pub struct GetCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> GetCourseUseCase<C> {
    pub async fn execute(&self, id: Uuid) -> Result<Course, PortalError> {
        load_course(&self.courses, id).await
    }
}

pub struct ListCoursesUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> ListCoursesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Course>, PortalError> {
        self.courses.list().await
    }
}

// ── UpdateCourse ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateCourseInput {
    pub title: Option<String>,
    /// `Some(None)` clears the description; a blank string does the same.
    pub description: Option<Option<String>>,
    pub capacity: Option<u32>,
}

pub struct UpdateCourseUseCase<C: CourseRepository, E: EnrollmentRepository> {
    pub courses: C,
    pub enrollments: E,
}

impl<C: CourseRepository, E: EnrollmentRepository> UpdateCourseUseCase<C, E> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateCourseInput,
    ) -> Result<Course, PortalError> {
        let mut course = load_course_for(&self.courses, actor, Operation::UpdateCourse, id).await?;

        if let Some(title) = input.title {
            course.title = validate_title(&title)?;
        }
        if let Some(description) = input.description {
            course.description = description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty());
        }
        if let Some(capacity) = validate_capacity(input.capacity)? {
            let active = self.enrollments.count_active(id).await?;
            if u64::from(capacity) < active {
                return Err(PortalError::InvalidInput(
                    "capacity is below the current enrollment",
                ));
            }
            course.capacity = Some(capacity);
        }
        course.updated_at = Utc::now();

        self.courses.update(&course).await?;
        Ok(course)
    }
}

// ── DeleteCourse ────────────────────────────────────────────────────────────

pub struct DeleteCourseUseCase<C: CourseRepository> {
    pub courses: C,
}

impl<C: CourseRepository> DeleteCourseUseCase<C> {
    pub async fn execute(&self, actor: &Actor, id: Uuid) -> Result<(), PortalError> {
        load_course_for(&self.courses, actor, Operation::DeleteCourse, id).await?;
        if !self.courses.delete(id).await? {
            return Err(PortalError::CourseNotFound);
        }
        tracing::info!(course_id = %id, by = %actor.user_id, "course deleted");
        Ok(())
    }
}

// ── ReassignTeacher ─────────────────────────────────────────────────────────

pub struct ReassignTeacherUseCase<U: UserRepository, C: CourseRepository> {
    pub users: U,
    pub courses: C,
}

impl<U: UserRepository, C: CourseRepository> ReassignTeacherUseCase<U, C> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Course, PortalError> {
        let mut course =
            load_course_for(&self.courses, actor, Operation::ReassignCourseTeacher, id).await?;
        require_teacher(&self.users, teacher_id).await?;

        self.courses.set_teacher(id, teacher_id).await?;
        tracing::info!(
            course_id = %id,
            from = %course.teacher_id,
            to = %teacher_id,
            "course teacher reassigned"
        );
        course.teacher_id = teacher_id;
        Ok(course)
    }
}
