use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use serde_json::json;
use uuid::Uuid;

use lms_portal_schema::outbox_events;

use crate::domain::repository::Mailer;
use crate::domain::types::OutgoingMail;
use crate::error::PortalError;

/// Outbox event kind picked up by the mail relay.
pub const MAIL_EVENT_KIND: &str = "mail";

/// Hands mail to the relay by writing an `outbox_events` row.
#[derive(Clone)]
pub struct OutboxMailer {
    pub db: DatabaseConnection,
}

impl Mailer for OutboxMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), PortalError> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        outbox_events::ActiveModel {
            id: Set(id),
            kind: Set(MAIL_EVENT_KIND.to_owned()),
            payload: Set(json!({
                "to": mail.to,
                "subject": mail.subject,
                "body": mail.body,
            })),
            idempotency_key: Set(format!("{MAIL_EVENT_KIND}:{id}")),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            next_attempt_at: Set(now),
            processed_at: Set(None),
            failed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("enqueue outgoing mail")?;
        tracing::debug!(event_id = %id, to = %mail.to, "mail queued");
        Ok(())
    }
}
