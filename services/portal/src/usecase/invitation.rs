use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use lms_domain::invitation::InvitationStatus;
use lms_domain::user::UserRole;

use crate::domain::access::{Actor, Operation, check_role};
use crate::domain::repository::{InvitationRepository, Mailer, UserRepository};
use crate::domain::types::{
    INVITATION_TOKEN_LEN, INVITATION_TTL_DAYS, MIN_PASSWORD_LEN, OutgoingMail, TeacherInvitation,
    User, is_plausible_email, normalize_email,
};
use crate::error::PortalError;
use crate::usecase::login::{Session, start_session};
use crate::usecase::password::hash_password;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..INVITATION_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

// ── InviteTeacher ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct InvitationOutcome {
    pub invitation: TeacherInvitation,
    pub delivered: bool,
}

pub struct InviteTeacherUseCase<U, I, M>
where
    U: UserRepository,
    I: InvitationRepository,
    M: Mailer,
{
    pub users: U,
    pub invitations: I,
    pub mailer: M,
    pub public_url: String,
}

impl<U, I, M> InviteTeacherUseCase<U, I, M>
where
    U: UserRepository,
    I: InvitationRepository,
    M: Mailer,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        email: &str,
    ) -> Result<InvitationOutcome, PortalError> {
        check_role(actor, Operation::InviteTeacher)?;

        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(PortalError::InvalidInput("email is not valid"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(PortalError::EmailAlreadyRegistered);
        }

        let now = Utc::now();
        let invitation = TeacherInvitation {
            id: Uuid::new_v4(),
            email,
            token: generate_token(),
            invited_by: actor.user_id,
            status: InvitationStatus::Pending,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
            created_at: now,
        };
        self.invitations.replace_for_email(&invitation).await?;

        let mail = OutgoingMail {
            to: invitation.email.clone(),
            subject: "You have been invited to teach".to_owned(),
            body: format!(
                "Accept your invitation within {INVITATION_TTL_DAYS} days: {}/accept-invitation?token={}",
                self.public_url.trim_end_matches('/'),
                invitation.token
            ),
        };
        let delivered = match self.mailer.deliver(&mail).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(email = %invitation.email, error = %e, "invitation delivery failed");
                false
            }
        };

        tracing::info!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            invited_by = %actor.user_id,
            delivered,
            "teacher invited"
        );
        Ok(InvitationOutcome {
            invitation,
            delivered,
        })
    }
}

// ── AcceptInvitation ────────────────────────────────────────────────────────

pub struct AcceptInvitationInput {
    pub token: String,
    pub name: String,
    pub password: String,
}

pub struct AcceptInvitationUseCase<U, I>
where
    U: UserRepository,
    I: InvitationRepository,
{
    pub users: U,
    pub invitations: I,
    pub jwt_secret: String,
}

impl<U, I> AcceptInvitationUseCase<U, I>
where
    U: UserRepository,
    I: InvitationRepository,
{
    pub async fn execute(&self, input: AcceptInvitationInput) -> Result<Session, PortalError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PortalError::InvalidInput("name must not be empty"));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PortalError::InvalidInput("password is too short"));
        }

        let invitation = self
            .invitations
            .find_by_token(input.token.trim())
            .await?
            .ok_or(PortalError::InvitationNotFound)?;

        if invitation.status != InvitationStatus::Pending {
            return Err(PortalError::InvalidInvitation);
        }
        let now = Utc::now();
        if now > invitation.expires_at {
            self.invitations
                .set_status(invitation.id, InvitationStatus::Expired, None)
                .await?;
            return Err(PortalError::InvalidInvitation);
        }
        if self.users.find_by_email(&invitation.email).await?.is_some() {
            return Err(PortalError::EmailAlreadyRegistered);
        }

        let user = User {
            id: Uuid::now_v7(),
            email: invitation.email.clone(),
            name: name.to_owned(),
            password_hash: hash_password(&input.password)?,
            role: UserRole::Teacher,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        self.invitations
            .set_status(invitation.id, InvitationStatus::Accepted, Some(now))
            .await?;

        tracing::info!(user_id = %user.id, invitation_id = %invitation.id, "invitation accepted");
        start_session(user, &self.jwt_secret)
    }
}

// ── SetTeacherActive ────────────────────────────────────────────────────────

pub struct SetTeacherActiveUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SetTeacherActiveUseCase<U> {
    pub async fn execute(
        &self,
        actor: &Actor,
        teacher_id: Uuid,
        active: bool,
    ) -> Result<(), PortalError> {
        check_role(actor, Operation::ToggleTeacherActive)?;

        let user = self
            .users
            .find_by_id(teacher_id)
            .await?
            .ok_or(PortalError::UserNotFound)?;
        if user.role != UserRole::Teacher {
            return Err(PortalError::InvalidInput("user is not a teacher"));
        }
        if !self.users.set_active(teacher_id, active).await? {
            return Err(PortalError::UserNotFound);
        }
        tracing::info!(teacher_id = %teacher_id, active, by = %actor.user_id, "teacher active flag set");
        Ok(())
    }
}
