//! No-op mailer selected when SMTP is not configured.

use async_trait::async_trait;

use quill_core::ports::{MailError, VerificationMailer};

pub struct NoopMailer;

#[async_trait]
impl VerificationMailer for NoopMailer {
    async fn send_verification(
        &self,
        _to: &str,
        _name: &str,
        _token: &str,
        _origin: &str,
    ) -> Result<(), MailError> {
        tracing::warn!("SMTP not configured. Skipping email verification send.");
        Ok(())
    }
}
