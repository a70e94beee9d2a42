//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! database repositories (Postgres via SeaORM, plus in-memory fallbacks),
//! JWT + Argon2 authentication, disk-backed media storage and SMTP mail.

pub mod auth;
pub mod database;
pub mod mailer;
pub mod media;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::{
    DatabaseConfig, DatabaseConnections, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, PgCommentRepository, PgPostRepository, PgUserRepository,
};
pub use mailer::{NoopMailer, SmtpMailer};
pub use media::{DiskMediaStore, InMemoryMediaStore};
