// src/outreach/mod.rs
pub mod generator;
pub mod sender;

pub use generator::{EmailGenerator, SenderInfo};
pub use sender::{EmailSender, SendOutcome, SendRequest};

use chrono::Utc;
use uuid::Uuid;

use crate::models::{EmailLogEntry, EmailProvider};

/// Builds the append-only log entry for one send attempt.
pub fn log_entry(
    prospect_id: &str,
    contact_id: Option<&str>,
    email_type: &str,
    recipient: &str,
    provider: EmailProvider,
    outcome: &SendOutcome,
) -> EmailLogEntry {
    EmailLogEntry {
        id: Uuid::new_v4().to_string(),
        prospect_id: prospect_id.to_string(),
        contact_id: contact_id.map(|s| s.to_string()),
        email_type: email_type.to_string(),
        recipient: recipient.to_string(),
        status: if outcome.success { "sent" } else { "failed" }.to_string(),
        provider: provider.as_str().to_string(),
        message_id: outcome.message_id.clone(),
        error: outcome.error.clone(),
        sent_at: Utc::now(),
    }
}
