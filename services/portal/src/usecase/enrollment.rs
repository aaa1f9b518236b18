use chrono::Utc;
use uuid::Uuid;

use lms_domain::enrollment::EnrollmentStatus;

use crate::domain::access::{Actor, Operation, check_role};
use crate::domain::repository::{CourseRepository, EnrollmentRepository};
use crate::domain::types::Enrollment;
use crate::error::PortalError;
use crate::usecase::course::load_course;

pub struct EnrollUseCase<C: CourseRepository, E: EnrollmentRepository> {
    pub courses: C,
    pub enrollments: E,
}

impl<C: CourseRepository, E: EnrollmentRepository> EnrollUseCase<C, E> {
    pub async fn execute(&self, actor: &Actor, course_id: Uuid) -> Result<Enrollment, PortalError> {
        check_role(actor, Operation::EnrollCourse)?;
        let course = load_course(&self.courses, course_id).await?;

        if self
            .enrollments
            .find_active(actor.user_id, course_id)
            .await?
            .is_some()
        {
            return Err(PortalError::AlreadyEnrolled);
        }

        let now = Utc::now();
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id: actor.user_id,
            course_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now,
            updated_at: now,
        };
        self.enrollments.create(&enrollment, course.capacity).await?;
        tracing::info!(student_id = %actor.user_id, course_id = %course_id, "enrolled");
        Ok(enrollment)
    }
}

pub struct DropEnrollmentUseCase<E: EnrollmentRepository> {
    pub enrollments: E,
}

impl<E: EnrollmentRepository> DropEnrollmentUseCase<E> {
    pub async fn execute(&self, actor: &Actor, course_id: Uuid) -> Result<(), PortalError> {
        check_role(actor, Operation::DropCourse)?;
        let enrollment = self
            .enrollments
            .find_active(actor.user_id, course_id)
            .await?
            .ok_or(PortalError::EnrollmentNotFound)?;
        self.enrollments
            .set_status(enrollment.id, EnrollmentStatus::Dropped)
            .await?;
        tracing::info!(student_id = %actor.user_id, course_id = %course_id, "enrollment dropped");
        Ok(())
    }
}
