use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use lms_domain::enrollment::EnrollmentStatus;
use lms_domain::invitation::InvitationStatus;
use lms_domain::submission::SubmissionStatus;
use lms_domain::user::UserRole;
use lms_portal_schema::{
    assignments, courses, enrollments, materials, one_time_codes, submissions,
    teacher_invitations, users,
};

use crate::domain::repository::{
    AssignmentRepository, CourseRepository, EnrollmentRepository, InvitationRepository,
    MaterialRepository, OneTimeCodeRepository, SubmissionRepository, UserRepository,
};
use crate::domain::types::{
    Assignment, Course, Enrollment, Material, OneTimeCode, Submission, TeacherInvitation, User,
};
use crate::error::PortalError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Map a unique violation to `conflict`, everything else to `Internal` with `context`.
fn conflict_or_internal(err: DbErr, conflict: PortalError, context: &'static str) -> PortalError {
    if is_unique_violation(&err) {
        conflict
    } else {
        PortalError::Internal(anyhow::Error::new(err).context(context))
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, PortalError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), PortalError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.as_str().to_owned()),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, PortalError::EmailAlreadyRegistered, "create user"))?;
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, PortalError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsActive, Expr::value(active))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set user active flag")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, PortalError> {
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        password_hash: model.password_hash,
        role: model.role.parse::<UserRole>().context("decode user role")?,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── One-time code repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOneTimeCodeRepository {
    pub db: DatabaseConnection,
}

impl OneTimeCodeRepository for DbOneTimeCodeRepository {
    async fn replace_for_email(&self, code: &OneTimeCode) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    one_time_codes::Entity::delete_many()
                        .filter(one_time_codes::Column::Email.eq(code.email.as_str()))
                        .filter(one_time_codes::Column::ConsumedAt.is_null())
                        .exec(txn)
                        .await?;
                    insert_one_time_code(txn, &code).await
                })
            })
            .await
            .context("replace one-time code")?;
        Ok(())
    }

    async fn find_latest_unconsumed(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<OneTimeCode>, PortalError> {
        let model = one_time_codes::Entity::find()
            .filter(one_time_codes::Column::Email.eq(email))
            .filter(one_time_codes::Column::Code.eq(code))
            .filter(one_time_codes::Column::ConsumedAt.is_null())
            .order_by_desc(one_time_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest unconsumed code")?;
        Ok(model.map(code_from_model))
    }

    async fn consume(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, PortalError> {
        // Conditional update: only one concurrent caller can flip consumed_at.
        let result = one_time_codes::Entity::update_many()
            .col_expr(one_time_codes::Column::ConsumedAt, Expr::value(at))
            .filter(one_time_codes::Column::Id.eq(id))
            .filter(one_time_codes::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("consume one-time code")?;
        Ok(result.rows_affected == 1)
    }
}

async fn insert_one_time_code(txn: &DatabaseTransaction, code: &OneTimeCode) -> Result<(), DbErr> {
    one_time_codes::ActiveModel {
        id: Set(code.id),
        email: Set(code.email.clone()),
        code: Set(code.code.clone()),
        expires_at: Set(code.expires_at),
        consumed_at: Set(None),
        created_at: Set(code.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(model: one_time_codes::Model) -> OneTimeCode {
    OneTimeCode {
        id: model.id,
        email: model.email,
        code: model.code,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        created_at: model.created_at,
    }
}

// ── Invitation repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInvitationRepository {
    pub db: DatabaseConnection,
}

impl InvitationRepository for DbInvitationRepository {
    async fn replace_for_email(&self, invitation: &TeacherInvitation) -> Result<(), PortalError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let invitation = invitation.clone();
                Box::pin(async move {
                    teacher_invitations::Entity::delete_many()
                        .filter(teacher_invitations::Column::Email.eq(invitation.email.as_str()))
                        .filter(
                            teacher_invitations::Column::Status
                                .eq(InvitationStatus::Pending.as_str()),
                        )
                        .exec(txn)
                        .await?;
                    teacher_invitations::ActiveModel {
                        id: Set(invitation.id),
                        email: Set(invitation.email.clone()),
                        token: Set(invitation.token.clone()),
                        invited_by: Set(invitation.invited_by),
                        status: Set(invitation.status.as_str().to_owned()),
                        expires_at: Set(invitation.expires_at),
                        accepted_at: Set(invitation.accepted_at),
                        created_at: Set(invitation.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace teacher invitation")?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<TeacherInvitation>, PortalError> {
        let model = teacher_invitations::Entity::find()
            .filter(teacher_invitations::Column::Token.eq(token))
            .one(&self.db)
            .await
            .context("find invitation by token")?;
        model.map(invitation_from_model).transpose()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: InvitationStatus,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Result<(), PortalError> {
        teacher_invitations::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            accepted_at: Set(accepted_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set invitation status")?;
        Ok(())
    }
}

fn invitation_from_model(
    model: teacher_invitations::Model,
) -> Result<TeacherInvitation, PortalError> {
    Ok(TeacherInvitation {
        id: model.id,
        email: model.email,
        token: model.token,
        invited_by: model.invited_by,
        status: model.status.parse::<InvitationStatus>().context("decode invitation status")?,
        expires_at: model.expires_at,
        accepted_at: model.accepted_at,
        created_at: model.created_at,
    })
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

fn capacity_to_db(capacity: Option<u32>) -> Result<Option<i32>, PortalError> {
    capacity
        .map(i32::try_from)
        .transpose()
        .map_err(|_| PortalError::InvalidInput("capacity is too large"))
}

impl CourseRepository for DbCourseRepository {
    async fn create(&self, course: &Course) -> Result<(), PortalError> {
        courses::ActiveModel {
            id: Set(course.id),
            title: Set(course.title.clone()),
            description: Set(course.description.clone()),
            teacher_id: Set(course.teacher_id),
            capacity: Set(capacity_to_db(course.capacity)?),
            created_at: Set(course.created_at),
            updated_at: Set(course.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create course")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, PortalError> {
        let model = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course by id")?;
        model.map(course_from_model).transpose()
    }

    async fn list(&self) -> Result<Vec<Course>, PortalError> {
        let models = courses::Entity::find()
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list courses")?;
        models.into_iter().map(course_from_model).collect()
    }

    async fn update(&self, course: &Course) -> Result<(), PortalError> {
        courses::ActiveModel {
            id: Set(course.id),
            title: Set(course.title.clone()),
            description: Set(course.description.clone()),
            capacity: Set(capacity_to_db(course.capacity)?),
            updated_at: Set(course.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update course")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalError> {
        let result = courses::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete course")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_teacher(&self, id: Uuid, teacher_id: Uuid) -> Result<(), PortalError> {
        courses::ActiveModel {
            id: Set(id),
            teacher_id: Set(teacher_id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set course teacher")?;
        Ok(())
    }
}

fn course_from_model(model: courses::Model) -> Result<Course, PortalError> {
    Ok(Course {
        id: model.id,
        title: model.title,
        description: model.description,
        teacher_id: model.teacher_id,
        capacity: model
            .capacity
            .map(u32::try_from)
            .transpose()
            .context("decode course capacity")?,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Enrollment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEnrollmentRepository {
    pub db: DatabaseConnection,
}

impl EnrollmentRepository for DbEnrollmentRepository {
    async fn find_active(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<Enrollment>, PortalError> {
        let model = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active.as_str()))
            .one(&self.db)
            .await
            .context("find active enrollment")?;
        model.map(enrollment_from_model).transpose()
    }

    async fn count_active(&self, course_id: Uuid) -> Result<u64, PortalError> {
        let count = enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active.as_str()))
            .count(&self.db)
            .await
            .context("count active enrollments")?;
        Ok(count)
    }

    async fn create(
        &self,
        enrollment: &Enrollment,
        capacity: Option<u32>,
    ) -> Result<(), PortalError> {
        let txn = self.db.begin().await.context("begin enrollment")?;

        // Row lock on the course serializes concurrent enrollments into it.
        courses::Entity::find_by_id(enrollment.course_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock course for enrollment")?
            .ok_or(PortalError::CourseNotFound)?;

        if let Some(capacity) = capacity {
            let active = enrollments::Entity::find()
                .filter(enrollments::Column::CourseId.eq(enrollment.course_id))
                .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active.as_str()))
                .count(&txn)
                .await
                .context("count active enrollments")?;
            if active >= u64::from(capacity) {
                return Err(PortalError::CourseFull);
            }
        }

        enrollments::ActiveModel {
            id: Set(enrollment.id),
            student_id: Set(enrollment.student_id),
            course_id: Set(enrollment.course_id),
            status: Set(enrollment.status.as_str().to_owned()),
            enrolled_at: Set(enrollment.enrolled_at),
            updated_at: Set(enrollment.updated_at),
        }
        .insert(&txn)
        .await
        .map_err(|e| conflict_or_internal(e, PortalError::AlreadyEnrolled, "create enrollment"))?;

        txn.commit().await.context("commit enrollment")?;
        Ok(())
    }

    async fn set_status(&self, id: Uuid, status: EnrollmentStatus) -> Result<(), PortalError> {
        enrollments::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set enrollment status")?;
        Ok(())
    }
}

fn enrollment_from_model(model: enrollments::Model) -> Result<Enrollment, PortalError> {
    Ok(Enrollment {
        id: model.id,
        student_id: model.student_id,
        course_id: model.course_id,
        status: model.status.parse::<EnrollmentStatus>().context("decode enrollment status")?,
        enrolled_at: model.enrolled_at,
        updated_at: model.updated_at,
    })
}

// ── Assignment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAssignmentRepository {
    pub db: DatabaseConnection,
}

impl AssignmentRepository for DbAssignmentRepository {
    async fn create(&self, assignment: &Assignment) -> Result<(), PortalError> {
        assignments::ActiveModel {
            id: Set(assignment.id),
            course_id: Set(assignment.course_id),
            title: Set(assignment.title.clone()),
            description: Set(assignment.description.clone()),
            due_at: Set(assignment.due_at),
            points: Set(i32::try_from(assignment.points)
                .map_err(|_| PortalError::InvalidInput("points is too large"))?),
            created_at: Set(assignment.created_at),
        }
        .insert(&self.db)
        .await
        .context("create assignment")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Assignment>, PortalError> {
        let model = assignments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find assignment by id")?;
        model.map(assignment_from_model).transpose()
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Assignment>, PortalError> {
        let models = assignments::Entity::find()
            .filter(assignments::Column::CourseId.eq(course_id))
            .order_by_asc(assignments::Column::DueAt)
            .all(&self.db)
            .await
            .context("list assignments by course")?;
        models.into_iter().map(assignment_from_model).collect()
    }
}

fn assignment_from_model(model: assignments::Model) -> Result<Assignment, PortalError> {
    Ok(Assignment {
        id: model.id,
        course_id: model.course_id,
        title: model.title,
        description: model.description,
        due_at: model.due_at,
        points: u32::try_from(model.points).context("decode assignment points")?,
        created_at: model.created_at,
    })
}

// ── Submission repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubmissionRepository {
    pub db: DatabaseConnection,
}

impl SubmissionRepository for DbSubmissionRepository {
    async fn find_by_pair(
        &self,
        assignment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Submission>, PortalError> {
        let model = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .filter(submissions::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .context("find submission by pair")?;
        model.map(submission_from_model).transpose()
    }

    async fn create(&self, submission: &Submission) -> Result<(), PortalError> {
        submissions::ActiveModel {
            id: Set(submission.id),
            assignment_id: Set(submission.assignment_id),
            student_id: Set(submission.student_id),
            content: Set(submission.content.clone()),
            status: Set(submission.status.as_str().to_owned()),
            grade: Set(submission.grade),
            feedback: Set(submission.feedback.clone()),
            submitted_at: Set(submission.submitted_at),
            graded_at: Set(submission.graded_at),
            graded_by: Set(submission.graded_by),
        }
        .insert(&self.db)
        .await
        .map_err(|e| conflict_or_internal(e, PortalError::AlreadySubmitted, "create submission"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, PortalError> {
        let model = submissions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find submission by id")?;
        model.map(submission_from_model).transpose()
    }

    async fn list_by_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, PortalError> {
        let models = submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(submissions::Column::SubmittedAt)
            .all(&self.db)
            .await
            .context("list submissions by assignment")?;
        models.into_iter().map(submission_from_model).collect()
    }

    async fn save_grade(&self, submission: &Submission) -> Result<(), PortalError> {
        submissions::ActiveModel {
            id: Set(submission.id),
            status: Set(submission.status.as_str().to_owned()),
            grade: Set(submission.grade),
            feedback: Set(submission.feedback.clone()),
            graded_at: Set(submission.graded_at),
            graded_by: Set(submission.graded_by),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("save submission grade")?;
        Ok(())
    }
}

fn submission_from_model(model: submissions::Model) -> Result<Submission, PortalError> {
    Ok(Submission {
        id: model.id,
        assignment_id: model.assignment_id,
        student_id: model.student_id,
        content: model.content,
        status: model.status.parse::<SubmissionStatus>().context("decode submission status")?,
        grade: model.grade,
        feedback: model.feedback,
        submitted_at: model.submitted_at,
        graded_at: model.graded_at,
        graded_by: model.graded_by,
    })
}

// ── Material repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMaterialRepository {
    pub db: DatabaseConnection,
}

impl MaterialRepository for DbMaterialRepository {
    async fn create(&self, material: &Material) -> Result<(), PortalError> {
        materials::ActiveModel {
            id: Set(material.id),
            course_id: Set(material.course_id),
            uploaded_by: Set(material.uploaded_by),
            title: Set(material.title.clone()),
            file_name: Set(material.file_name.clone()),
            content_type: Set(material.content_type.clone()),
            size_bytes: Set(i64::try_from(material.size_bytes)
                .map_err(|_| PortalError::InvalidInput("file is too large"))?),
            url: Set(material.url.clone()),
            created_at: Set(material.created_at),
            updated_at: Set(material.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create material")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>, PortalError> {
        let model = materials::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find material by id")?;
        model.map(material_from_model).transpose()
    }

    async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Material>, PortalError> {
        let models = materials::Entity::find()
            .filter(materials::Column::CourseId.eq(course_id))
            .order_by_desc(materials::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list materials by course")?;
        models.into_iter().map(material_from_model).collect()
    }

    async fn update(&self, material: &Material) -> Result<(), PortalError> {
        materials::ActiveModel {
            id: Set(material.id),
            title: Set(material.title.clone()),
            url: Set(material.url.clone()),
            updated_at: Set(material.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update material")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PortalError> {
        let result = materials::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete material")?;
        Ok(result.rows_affected > 0)
    }
}

fn material_from_model(model: materials::Model) -> Result<Material, PortalError> {
    Ok(Material {
        id: model.id,
        course_id: model.course_id,
        uploaded_by: model.uploaded_by,
        title: model.title,
        file_name: model.file_name,
        content_type: model.content_type,
        size_bytes: u64::try_from(model.size_bytes).context("decode material size")?,
        url: model.url,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
