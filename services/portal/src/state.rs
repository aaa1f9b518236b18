use sea_orm::DatabaseConnection;

use lms_auth_types::identity::SessionSecret;

use crate::infra::db::{
    DbAssignmentRepository, DbCourseRepository, DbEnrollmentRepository, DbInvitationRepository,
    DbMaterialRepository, DbOneTimeCodeRepository, DbSubmissionRepository, DbUserRepository,
};
use crate::infra::mail::OutboxMailer;
use crate::usecase::otp::OneTimeCodeService;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    /// Base URL of the web client, used in invitation links.
    pub public_url: String,
}

impl SessionSecret for AppState {
    fn session_secret(&self) -> &str {
        &self.jwt_secret
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbOneTimeCodeRepository {
        DbOneTimeCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn invitation_repo(&self) -> DbInvitationRepository {
        DbInvitationRepository {
            db: self.db.clone(),
        }
    }

    pub fn course_repo(&self) -> DbCourseRepository {
        DbCourseRepository {
            db: self.db.clone(),
        }
    }

    pub fn enrollment_repo(&self) -> DbEnrollmentRepository {
        DbEnrollmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn assignment_repo(&self) -> DbAssignmentRepository {
        DbAssignmentRepository {
            db: self.db.clone(),
        }
    }

    pub fn submission_repo(&self) -> DbSubmissionRepository {
        DbSubmissionRepository {
            db: self.db.clone(),
        }
    }

    pub fn material_repo(&self) -> DbMaterialRepository {
        DbMaterialRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> OutboxMailer {
        OutboxMailer {
            db: self.db.clone(),
        }
    }

    pub fn otp_service(&self) -> OneTimeCodeService<DbOneTimeCodeRepository, OutboxMailer> {
        OneTimeCodeService {
            codes: self.code_repo(),
            mailer: self.mailer(),
        }
    }
}
