//! SMTP verification mailer via lettre.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use quill_core::ports::{MailError, VerificationMailer};

/// SMTP transport configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
}

impl SmtpConfig {
    /// Read `SMTP_*` env vars. Returns None unless host, user, password and
    /// from-address are all present.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?.trim().to_string();
        let username = std::env::var("SMTP_USER").ok()?.trim().to_string();
        // App passwords are often pasted with spaces; normalize before auth.
        let password: String = std::env::var("SMTP_PASS")
            .ok()?
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let from_email = std::env::var("SMTP_FROM_EMAIL").ok()?.trim().to_string();
        if host.is_empty() || username.is_empty() || password.is_empty() || from_email.is_empty() {
            return None;
        }

        Some(Self {
            host,
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username,
            password,
            from_email,
        })
    }
}

/// Verification mailer backed by an async SMTP transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let from: Mailbox = config
            .from_email
            .parse()
            .map_err(|e| MailError::Send(format!("invalid from address: {e}")))?;

        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Send(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl VerificationMailer for SmtpMailer {
    async fn send_verification(
        &self,
        to: &str,
        name: &str,
        token: &str,
        origin: &str,
    ) -> Result<(), MailError> {
        let verify_url = format!("{}/verify-email?token={token}", origin.trim_end_matches('/'));
        let greeting = if name.is_empty() { "there" } else { name };
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; line-height: 1.6;\">\
               <h2>Verify your Quill email</h2>\
               <p>Hi {greeting}, click the button below to verify your email.</p>\
               <p><a href=\"{verify_url}\" style=\"display:inline-block;background:#111827;\
color:#fff;padding:10px 16px;border-radius:999px;text-decoration:none;\">Verify Email</a></p>\
               <p>If you did not create an account, you can ignore this email.</p>\
             </div>"
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| MailError::Send(format!("invalid recipient: {e}")))?)
            .subject("Verify your Quill email")
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| MailError::Send(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }
}
