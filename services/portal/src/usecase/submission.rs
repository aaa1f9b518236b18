use chrono::{DateTime, Utc};
use uuid::Uuid;

use lms_domain::submission::SubmissionStatus;

use crate::domain::access::{Actor, Operation, check_role};
use crate::domain::repository::{
    AssignmentRepository, CourseRepository, EnrollmentRepository, SubmissionRepository,
};
use crate::domain::types::{Assignment, Submission};
use crate::error::PortalError;
use crate::usecase::course::load_course_for;

async fn load_assignment<A: AssignmentRepository>(
    assignments: &A,
    id: Uuid,
) -> Result<Assignment, PortalError> {
    assignments
        .find_by_id(id)
        .await?
        .ok_or(PortalError::AssignmentNotFound)
}

// ── SubmitAssignment ────────────────────────────────────────────────────────

pub struct SubmitAssignmentUseCase<A, E, S>
where
    A: AssignmentRepository,
    E: EnrollmentRepository,
    S: SubmissionRepository,
{
    pub assignments: A,
    pub enrollments: E,
    pub submissions: S,
}

impl<A, E, S> SubmitAssignmentUseCase<A, E, S>
where
    A: AssignmentRepository,
    E: EnrollmentRepository,
    S: SubmissionRepository,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        assignment_id: Uuid,
        content: String,
    ) -> Result<Submission, PortalError> {
        self.execute_at(actor, assignment_id, content, Utc::now())
            .await
    }

    /// Submit as of `now`. Lateness is decided against this instant.
    pub async fn execute_at(
        &self,
        actor: &Actor,
        assignment_id: Uuid,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<Submission, PortalError> {
        check_role(actor, Operation::SubmitAssignment)?;
        let assignment = load_assignment(&self.assignments, assignment_id).await?;

        if self
            .enrollments
            .find_active(actor.user_id, assignment.course_id)
            .await?
            .is_none()
        {
            tracing::info!(student_id = %actor.user_id, course_id = %assignment.course_id, "submission without enrollment");
            return Err(PortalError::Forbidden);
        }
        if content.trim().is_empty() {
            return Err(PortalError::InvalidInput("content must not be empty"));
        }

        // Lookup first for a clean error; the unique index catches the concurrent case.
        if self
            .submissions
            .find_by_pair(assignment_id, actor.user_id)
            .await?
            .is_some()
        {
            return Err(PortalError::AlreadySubmitted);
        }

        let submission = Submission {
            id: Uuid::now_v7(),
            assignment_id,
            student_id: actor.user_id,
            content,
            status: SubmissionStatus::on_submit(now, assignment.due_at),
            grade: None,
            feedback: None,
            submitted_at: now,
            graded_at: None,
            graded_by: None,
        };
        self.submissions.create(&submission).await?;
        tracing::info!(
            submission_id = %submission.id,
            assignment_id = %assignment_id,
            student_id = %actor.user_id,
            status = %submission.status,
            "assignment submitted"
        );
        Ok(submission)
    }
}

// ── ListSubmissions ─────────────────────────────────────────────────────────

pub struct ListSubmissionsUseCase<C, A, S>
where
    C: CourseRepository,
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    pub courses: C,
    pub assignments: A,
    pub submissions: S,
}

impl<C, A, S> ListSubmissionsUseCase<C, A, S>
where
    C: CourseRepository,
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        assignment_id: Uuid,
    ) -> Result<Vec<Submission>, PortalError> {
        check_role(actor, Operation::ViewSubmissions)?;
        let assignment = load_assignment(&self.assignments, assignment_id).await?;
        load_course_for(
            &self.courses,
            actor,
            Operation::ViewSubmissions,
            assignment.course_id,
        )
        .await?;
        self.submissions.list_by_assignment(assignment_id).await
    }
}

// ── GradeSubmission ─────────────────────────────────────────────────────────

pub struct GradeInput {
    pub grade: f64,
    pub feedback: Option<String>,
}

pub struct GradeSubmissionUseCase<C, A, S>
where
    C: CourseRepository,
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    pub courses: C,
    pub assignments: A,
    pub submissions: S,
}

impl<C, A, S> GradeSubmissionUseCase<C, A, S>
where
    C: CourseRepository,
    A: AssignmentRepository,
    S: SubmissionRepository,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        submission_id: Uuid,
        input: GradeInput,
    ) -> Result<Submission, PortalError> {
        check_role(actor, Operation::GradeSubmission)?;
        let mut submission = self
            .submissions
            .find_by_id(submission_id)
            .await?
            .ok_or(PortalError::SubmissionNotFound)?;
        let assignment = load_assignment(&self.assignments, submission.assignment_id).await?;
        load_course_for(
            &self.courses,
            actor,
            Operation::GradeSubmission,
            assignment.course_id,
        )
        .await?;

        if !submission.status.is_gradable() {
            return Err(PortalError::InvalidInput("submission is not gradable"));
        }
        if !input.grade.is_finite() || input.grade < 0.0 || input.grade > f64::from(assignment.points)
        {
            return Err(PortalError::InvalidInput("grade is out of range"));
        }

        // Regrading replaces the previous grade.
        if let Some(previous) = submission.grade {
            tracing::info!(
                submission_id = %submission.id,
                previous_grade = previous,
                new_grade = input.grade,
                by = %actor.user_id,
                "overwriting existing grade"
            );
        }

        submission.status = SubmissionStatus::Graded;
        submission.grade = Some(input.grade);
        submission.feedback = input.feedback;
        submission.graded_at = Some(Utc::now());
        submission.graded_by = Some(actor.user_id);
        self.submissions.save_grade(&submission).await?;

        tracing::info!(submission_id = %submission.id, by = %actor.user_id, "submission graded");
        Ok(submission)
    }
}
