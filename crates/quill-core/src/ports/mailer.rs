//! Outbound email port.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email send failed: {0}")]
    Send(String),
}

/// Sends account-verification emails. Implementations without configured
/// transport silently skip the send.
#[async_trait]
pub trait VerificationMailer: Send + Sync {
    /// Send a verification email containing a link built from `origin` and
    /// the opaque token.
    async fn send_verification(
        &self,
        to: &str,
        name: &str,
        token: &str,
        origin: &str,
    ) -> Result<(), MailError>;
}
