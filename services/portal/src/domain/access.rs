//! Capability matrix.
//!
//! Every protected operation is gated twice: a role gate (the set of roles that may
//! attempt it) and, for resource-scoped operations, an ownership gate. `Admin`
//! satisfies every ownership gate implicitly. Both are evaluated from the signed
//! token claims and freshly loaded resource owners on each request.

use uuid::Uuid;

use lms_auth_types::identity::BearerIdentity;
use lms_domain::user::UserRole;

use crate::error::PortalError;

/// Who is acting, as stated by the verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl From<BearerIdentity> for Actor {
    fn from(identity: BearerIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCourse,
    UpdateCourse,
    DeleteCourse,
    ReassignCourseTeacher,
    EnrollCourse,
    DropCourse,
    CreateAssignment,
    SubmitAssignment,
    TakeQuiz,
    ViewSubmissions,
    GradeSubmission,
    UploadMaterial,
    UpdateMaterial,
    DeleteMaterial,
    InviteTeacher,
    ToggleTeacherActive,
    ViewSystemAnalytics,
}

/// Relationship the actor must hold to the target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    NotRequired,
    /// Actor is the course's teacher of record.
    CourseTeacher,
    /// Actor is the course's teacher of record or the material's uploader.
    CourseTeacherOrUploader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub roles: &'static [UserRole],
    pub ownership: Ownership,
}

const STAFF: &[UserRole] = &[UserRole::Teacher, UserRole::Admin];
const STUDENT: &[UserRole] = &[UserRole::Student];
const ADMIN: &[UserRole] = &[UserRole::Admin];

/// The lookup table.
pub fn rule(op: Operation) -> Rule {
    use Operation::*;
    use Ownership::*;

    let (roles, ownership) = match op {
        CreateCourse => (STAFF, NotRequired),
        UpdateCourse | DeleteCourse => (STAFF, CourseTeacher),
        ReassignCourseTeacher => (ADMIN, NotRequired),
        EnrollCourse | DropCourse | SubmitAssignment | TakeQuiz => (STUDENT, NotRequired),
        CreateAssignment | ViewSubmissions | GradeSubmission => (STAFF, CourseTeacher),
        UploadMaterial | UpdateMaterial | DeleteMaterial => (STAFF, CourseTeacherOrUploader),
        InviteTeacher | ToggleTeacherActive | ViewSystemAnalytics => (ADMIN, NotRequired),
    };
    Rule { roles, ownership }
}

/// Owners of the resource an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOwners {
    pub course_teacher_id: Uuid,
    pub uploader_id: Option<Uuid>,
}

impl ResourceOwners {
    pub fn course(teacher_id: Uuid) -> Self {
        Self {
            course_teacher_id: teacher_id,
            uploader_id: None,
        }
    }

    pub fn material(course_teacher_id: Uuid, uploader_id: Uuid) -> Self {
        Self {
            course_teacher_id,
            uploader_id: Some(uploader_id),
        }
    }
}

fn role_permitted(actor: &Actor, rule: Rule) -> bool {
    rule.roles.contains(&actor.role)
}

fn owns(actor: &Actor, ownership: Ownership, resource: Option<&ResourceOwners>) -> bool {
    if ownership == Ownership::NotRequired || actor.role == UserRole::Admin {
        return true;
    }
    // Ownership required but nothing to check against: fail closed.
    let Some(resource) = resource else {
        return false;
    };
    match ownership {
        Ownership::NotRequired => true,
        Ownership::CourseTeacher => resource.course_teacher_id == actor.user_id,
        Ownership::CourseTeacherOrUploader => {
            resource.course_teacher_id == actor.user_id
                || resource.uploader_id == Some(actor.user_id)
        }
    }
}

/// `hasAccess(actor, resource, relation)`: both gates for `op`.
pub fn has_access(actor: &Actor, op: Operation, resource: Option<&ResourceOwners>) -> bool {
    let rule = rule(op);
    role_permitted(actor, rule) && owns(actor, rule.ownership, resource)
}

/// Role gate only. Run before loading the resource so outsiders never reach the store.
pub fn check_role(actor: &Actor, op: Operation) -> Result<(), PortalError> {
    if role_permitted(actor, rule(op)) {
        Ok(())
    } else {
        tracing::info!(user_id = %actor.user_id, role = %actor.role, ?op, "role gate denied");
        Err(PortalError::Forbidden)
    }
}

/// Both gates, mapped to `Forbidden`.
pub fn authorize(
    actor: &Actor,
    op: Operation,
    resource: Option<&ResourceOwners>,
) -> Result<(), PortalError> {
    if has_access(actor, op, resource) {
        Ok(())
    } else {
        tracing::info!(user_id = %actor.user_id, role = %actor.role, ?op, "access denied");
        Err(PortalError::Forbidden)
    }
}
