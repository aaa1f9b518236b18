use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{Mailer, OneTimeCodeRepository};
use crate::domain::types::{OTP_LEN, OTP_TTL_SECS, OneTimeCode, OutgoingMail};
use crate::error::{CodeRejection, PortalError};

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// What the code is for; only changes the mail wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    Login,
    Registration,
}

impl CodePurpose {
    fn mail(self, to: &str, code: &str) -> OutgoingMail {
        let (subject, action) = match self {
            Self::Login => ("Your login code", "sign in"),
            Self::Registration => ("Verify your email", "finish registering"),
        };
        OutgoingMail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: format!(
                "Use {code} to {action}. The code expires in {} minutes.",
                OTP_TTL_SECS / 60
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueOutcome {
    /// `false` means the code exists but the mail may not have gone out.
    pub delivered: bool,
}

/// Issues and verifies single-use codes bound to an email address.
///
/// Issuing supersedes every unconsumed code for the email. Verification picks the
/// most recent unconsumed match, refuses it if expired (without consuming it), and
/// consumes it with a conditional update so that two concurrent verifications of
/// the same code cannot both succeed.
pub struct OneTimeCodeService<C, M>
where
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub codes: C,
    pub mailer: M,
}

impl<C, M> OneTimeCodeService<C, M>
where
    C: OneTimeCodeRepository,
    M: Mailer,
{
    pub async fn issue(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<IssueOutcome, PortalError> {
        let now = Utc::now();
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            code: generate_code(),
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            consumed_at: None,
            created_at: now,
        };
        self.codes.replace_for_email(&code).await?;

        let delivered = match self.mailer.deliver(&purpose.mail(email, &code.code)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(email, error = %e, "one-time code delivery failed");
                false
            }
        };
        tracing::info!(email, ?purpose, delivered, "one-time code issued");
        Ok(IssueOutcome { delivered })
    }

    pub async fn verify(&self, email: &str, code: &str) -> Result<(), PortalError> {
        let reject = |reason: CodeRejection| {
            tracing::info!(email, ?reason, "one-time code rejected");
            PortalError::InvalidCode(reason)
        };

        let Some(found) = self.codes.find_latest_unconsumed(email, code).await? else {
            return Err(reject(CodeRejection::NotFound));
        };

        let now = Utc::now();
        if found.is_expired_at(now) {
            return Err(reject(CodeRejection::Expired));
        }
        if !self.codes.consume(found.id, now).await? {
            return Err(reject(CodeRejection::AlreadyConsumed));
        }
        Ok(())
    }
}
