#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use lms_domain::enrollment::EnrollmentStatus;
use lms_domain::invitation::InvitationStatus;

use crate::domain::types::{
    Assignment, Course, Enrollment, Material, OneTimeCode, OutgoingMail, Submission,
    TeacherInvitation, User,
};
use crate::error::PortalError;

/// Credential store.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError>;

    /// Insert a user. Fails with `EmailAlreadyRegistered` on a duplicate email.
    async fn create(&self, user: &User) -> Result<(), PortalError>;

    /// Returns `false` if no such user exists.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, PortalError>;
}

/// Repository for one-time codes.
pub trait OneTimeCodeRepository: Send + Sync {
    /// Delete every unconsumed code for `code.email` and insert `code`, in one transaction.
    async fn replace_for_email(&self, code: &OneTimeCode) -> Result<(), PortalError>;

    /// Most recent unconsumed code for the email matching `code`, expired or not.
    async fn find_latest_unconsumed(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OneTimeCode>, PortalError>;

    /// Atomically mark the code consumed. Returns `false` if it was already consumed.
    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PortalError>;
}

pub trait InvitationRepository: Send + Sync {
    /// Delete every pending invitation for `invitation.email` and insert `invitation`.
    async fn replace_for_email(&self, invitation: &TeacherInvitation) -> Result<(), PortalError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<TeacherInvitation>, PortalError>;

    async fn set_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<(), PortalError>;
}

pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<(), PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, PortalError>;
    async fn list(&self) -> Result<Vec<Course>, PortalError>;

    /// Persist title, description and capacity.
    async fn update(&self, course: &Course) -> Result<(), PortalError>;

    /// Returns `false` if the course did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, PortalError>;

    async fn set_teacher(&self, id: Uuid, teacher_id: Uuid) -> Result<(), PortalError>;
}

pub trait EnrollmentRepository: Send + Sync {
    async fn find_active(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, PortalError>;

    async fn count_active(&self, course_id: Uuid) -> Result<u64, PortalError>;

    /// Insert an active enrollment, atomically with the seat check.
    /// Fails with `CourseFull` once `capacity` active enrollments exist and with
    /// `AlreadyEnrolled` when the pair already has an active one.
    async fn create(
        &self,
        enrollment: &Enrollment,
        capacity: Option<u32>,
    ) -> Result<(), PortalError>;

    async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> Result<(), PortalError>;
}

pub trait AssignmentRepository: Send + Sync {
    async fn create(&self, assignment: &Assignment) -> Result<(), PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, PortalError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, PortalError>;
}

pub trait SubmissionRepository: Send + Sync {
    async fn find_by_pair(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>, PortalError>;

    /// Insert a submission. Fails with `AlreadySubmitted` if the pair already has one.
    async fn create(&self, submission: &Submission) -> Result<(), PortalError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, PortalError>;

    async fn list_by_assignment(&self, assignment_id: Uuid)
    -> Result<Vec<Submission>, PortalError>;

    /// Persist status, grade, feedback, graded_at and graded_by.
    async fn save_grade(&self, submission: &Submission) -> Result<(), PortalError>;
}

pub trait MaterialRepository: Send + Sync {
    async fn create(&self, material: &Material) -> Result<(), PortalError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>, PortalError>;
    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Material>, PortalError>;
    async fn update(&self, material: &Material) -> Result<(), PortalError>;

    /// Returns `false` if the material did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, PortalError>;
}

/// Outbound mail collaborator: deliver a message, report success or failure.
pub trait Mailer: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), PortalError>;
}
