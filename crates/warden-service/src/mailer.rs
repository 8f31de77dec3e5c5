//! Outbound email seam.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;
use warden_core::WardenResult;

/// A message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email dispatch.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a message and returns the provider's message id.
    async fn send(&self, email: OutboundEmail) -> WardenResult<String>;
}

/// Mailer that only logs. For local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutboundEmail) -> WardenResult<String> {
        let message_id = Uuid::new_v4().to_string();
        info!(to = %email.to, subject = %email.subject, %message_id, "Email not sent (log mailer)");
        Ok(message_id)
    }
}
