use chrono::Utc;
use uuid::Uuid;

use lms_auth_types::token::issue_session_token;
use lms_domain::user::UserRole;

use crate::domain::repository::{Mailer, OneTimeCodeRepository, UserRepository};
use crate::domain::types::{MIN_PASSWORD_LEN, User, is_plausible_email, normalize_email};
use crate::error::PortalError;
use crate::usecase::otp::{CodePurpose, IssueOutcome, OneTimeCodeService};
use crate::usecase::password::{check_password, hash_password};

/// A signed-in user and their bearer token.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub expires_at: u64,
}

pub(crate) fn start_session(user: User, secret: &str) -> Result<Session, PortalError> {
    let issued = issue_session_token(user.id, user.role, secret)
        .map_err(|e| PortalError::Internal(e.into()))?;
    Ok(Session {
        user,
        token: issued.token,
        expires_at: issued.expires_at,
    })
}

pub struct CredentialsInput {
    pub email: String,
    pub password: String,
}

/// Unknown email, inactive account and wrong password are indistinguishable to the caller,
/// in outcome and in bcrypt work spent.
async fn verify_credentials<U: UserRepository>(
    users: &U,
    input: &CredentialsInput,
) -> Result<User, PortalError> {
    let email = normalize_email(&input.email);
    let user = users.find_by_email(&email).await?;
    let password_ok = check_password(
        &input.password,
        user.as_ref().map(|u| u.password_hash.as_str()),
    );
    match user.filter(|u| u.is_active && password_ok) {
        Some(user) => Ok(user),
        None => {
            tracing::info!(email, "credential check failed");
            Err(PortalError::InvalidCredentials)
        }
    }
}

// ── CheckRole ───────────────────────────────────────────────────────────────

pub struct CheckRoleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CheckRoleUseCase<U> {
    pub async fn execute(&self, input: CredentialsInput) -> Result<UserRole, PortalError> {
        let user = verify_credentials(&self.users, &input).await?;
        Ok(user.role)
    }
}

// ── PasswordLogin (single-factor, admin only) ───────────────────────────────

pub struct PasswordLoginUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> PasswordLoginUseCase<U> {
    pub async fn execute(&self, input: CredentialsInput) -> Result<Session, PortalError> {
        let user = verify_credentials(&self.users, &input).await?;
        if user.role.requires_second_factor() {
            tracing::info!(user_id = %user.id, role = %user.role, "password-only login refused");
            return Err(PortalError::SecondFactorRequired);
        }
        tracing::info!(user_id = %user.id, "password login");
        start_session(user, &self.jwt_secret)
    }
}

// ── RequestLoginCode ────────────────────────────────────────────────────────

pub struct RequestLoginCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub users: U,
    pub otp: OneTimeCodeService<C, M>,
}

impl<U, C, M> RequestLoginCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: CredentialsInput) -> Result<IssueOutcome, PortalError> {
        let user = verify_credentials(&self.users, &input).await?;
        self.otp.issue(&user.email, CodePurpose::Login).await
    }
}

// ── VerifyLoginCode ─────────────────────────────────────────────────────────

pub struct VerifyCodeInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyLoginCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub users: U,
    pub otp: OneTimeCodeService<C, M>,
    pub jwt_secret: String,
}

impl<U, C, M> VerifyLoginCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: VerifyCodeInput) -> Result<Session, PortalError> {
        let email = normalize_email(&input.email);
        self.otp.verify(&email, input.code.trim()).await?;

        // The account may have been deactivated since the code was issued.
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(PortalError::InvalidCredentials)?;

        tracing::info!(user_id = %user.id, "two-factor login");
        start_session(user, &self.jwt_secret)
    }
}

// ── Registration ────────────────────────────────────────────────────────────

pub struct RequestRegistrationCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub users: U,
    pub otp: OneTimeCodeService<C, M>,
}

impl<U, C, M> RequestRegistrationCodeUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub async fn execute(&self, email: &str) -> Result<IssueOutcome, PortalError> {
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(PortalError::InvalidInput("email is not valid"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(PortalError::EmailAlreadyRegistered);
        }
        self.otp.issue(&email, CodePurpose::Registration).await
    }
}

pub struct CompleteRegistrationInput {
    pub email: String,
    pub name: String,
    pub password: String,
    pub code: String,
    /// Ignored: self-service accounts are always students.
    pub requested_role: Option<String>,
}

pub struct CompleteRegistrationUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub users: U,
    pub otp: OneTimeCodeService<C, M>,
    pub jwt_secret: String,
}

impl<U, C, M> CompleteRegistrationUseCase<U, C, M>
where
    U: UserRepository,
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: CompleteRegistrationInput) -> Result<Session, PortalError> {
        let email = normalize_email(&input.email);
        let name = input.name.trim();
        // Validate before touching the code so a bad form does not burn it.
        if name.is_empty() {
            return Err(PortalError::InvalidInput("name must not be empty"));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PortalError::InvalidInput("password is too short"));
        }

        self.otp.verify(&email, input.code.trim()).await?;

        // Someone may have registered this email after the code went out.
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(PortalError::EmailAlreadyRegistered);
        }

        if let Some(hint) = input.requested_role.as_deref() {
            tracing::info!(email, requested_role = hint, "ignoring role hint on registration");
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email,
            name: name.to_owned(),
            password_hash: hash_password(&input.password)?,
            role: UserRole::Student,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;

        tracing::info!(user_id = %user.id, "student registered");
        start_session(user, &self.jwt_secret)
    }
}

// ── Profile ─────────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, PortalError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(PortalError::UserNotFound)
    }
}

// ── Bootstrap administrator ─────────────────────────────────────────────────

pub struct SeedAdminUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SeedAdminUseCase<U> {
    /// Creates the administrator unless the email is already taken. Returns whether it did.
    pub async fn execute(&self, email: &str, password: &str) -> Result<bool, PortalError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        let now = Utc::now();
        let admin = User {
            id: Uuid::now_v7(),
            email,
            name: "Administrator".to_owned(),
            password_hash: hash_password(password)?,
            role: UserRole::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&admin).await?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "seeded administrator");
        Ok(true)
    }
}
