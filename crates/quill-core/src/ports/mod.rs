//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod mailer;
mod media;
mod repository;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use mailer::{MailError, VerificationMailer};
pub use media::{MediaError, MediaStore, StoredImage};
pub use repository::{
    CommentRepository, PostQuery, PostRepository, UserRepository,
};
