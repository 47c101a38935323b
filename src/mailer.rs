//! Outbound mail delivery abstraction.
//!
//! Delivery failures never block the primary action; callers log them and
//! move on. The default sender for local development is [`LogMailer`], which
//! logs and returns `Ok(())`.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Mail delivery collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message or return an error for the caller to log.
    async fn send(&self, recipients: &[String], subject: &str, html_body: &str) -> Result<()>;
}

/// Local development mailer that logs the payload instead of sending.
#[derive(Clone, Debug)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, recipients: &[String], subject: &str, html_body: &str) -> Result<()> {
        info!(
            recipients = %recipients.join(", "),
            subject = %subject,
            body_bytes = html_body.len(),
            "mail send stub"
        );
        Ok(())
    }
}
