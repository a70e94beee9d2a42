//! Outbound email implementations.

mod noop;
mod smtp;

pub use noop::NoopMailer;
pub use smtp::{SmtpConfig, SmtpMailer};
