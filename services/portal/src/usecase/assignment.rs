use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::access::{Actor, Operation};
use crate::domain::repository::{AssignmentRepository, CourseRepository};
use crate::domain::types::Assignment;
use crate::error::PortalError;
use crate::usecase::course::{load_course, load_course_for};

pub struct CreateAssignmentInput {
    pub title: String,
    pub description: Option<String>,
    pub due_at: DateTime<Utc>,
    pub points: u32,
}

pub struct CreateAssignmentUseCase<C: CourseRepository, A: AssignmentRepository> {
    pub courses: C,
    pub assignments: A,
}

impl<C: CourseRepository, A: AssignmentRepository> CreateAssignmentUseCase<C, A> {
    pub async fn execute(
        &self,
        actor: &Actor,
        course_id: Uuid,
        input: CreateAssignmentInput,
    ) -> Result<Assignment, PortalError> {
        load_course_for(&self.courses, actor, Operation::CreateAssignment, course_id).await?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(PortalError::InvalidInput("title must not be empty"));
        }
        if input.points == 0 {
            return Err(PortalError::InvalidInput("points must be positive"));
        }

        let assignment = Assignment {
            id: Uuid::now_v7(),
            course_id,
            title: title.to_owned(),
            description: input.description,
            due_at: input.due_at,
            points: input.points,
            created_at: Utc::now(),
        };
        self.assignments.create(&assignment).await?;
        tracing::info!(assignment_id = %assignment.id, course_id = %course_id, "assignment created");
        Ok(assignment)
    }
}

pub struct ListAssignmentsUseCase<C: CourseRepository, A: AssignmentRepository> {
    pub courses: C,
    pub assignments: A,
}

impl<C: CourseRepository, A: AssignmentRepository> ListAssignmentsUseCase<C, A> {
    pub async fn execute(&self, course_id: Uuid) -> Result<Vec<Assignment>, PortalError> {
        load_course(&self.courses, course_id).await?;
        self.assignments.list_by_course(course_id).await
    }
}
