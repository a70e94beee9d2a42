//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, MediaStore, PostRepository, TokenService, UserRepository,
    VerificationMailer,
};
use quill_core::services::{PostService, UserService};
use quill_infra::database::{
    DatabaseConnections, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, PgCommentRepository, PgPostRepository, PgUserRepository,
};
use quill_infra::mailer::{NoopMailer, SmtpConfig, SmtpMailer};
use quill_infra::media::{DiskMediaStore, InMemoryMediaStore};
use quill_infra::{Argon2PasswordService, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub posts: PostService,
    pub accounts: UserService,
    pub token_service: Arc<dyn TokenService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: AppConfig) -> Self {
        let repos: (
            Arc<dyn UserRepository>,
            Arc<dyn PostRepository>,
            Arc<dyn CommentRepository>,
        ) = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => (
                    Arc::new(PgUserRepository::new(connections.main.clone())),
                    Arc::new(PgPostRepository::new(connections.main.clone())),
                    Arc::new(PgCommentRepository::new(connections.main)),
                ),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::memory_repos()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::memory_repos()
            }
        };

        let media: Arc<dyn MediaStore> =
            Arc::new(DiskMediaStore::new(config.upload_dir.clone(), "/uploads"));

        let mailer: Arc<dyn VerificationMailer> = match SmtpConfig::from_env() {
            Some(smtp) => match SmtpMailer::new(smtp) {
                Ok(mailer) => Arc::new(mailer),
                Err(e) => {
                    tracing::error!("SMTP setup failed: {}. Emails will be skipped.", e);
                    Arc::new(NoopMailer)
                }
            },
            None => Arc::new(NoopMailer),
        };

        let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        Self::assemble(config, repos, media, mailer, token_service)
    }

    /// State wired entirely to in-memory implementations. Used by the tests.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::assemble(
            config,
            Self::memory_repos(),
            Arc::new(InMemoryMediaStore::new()),
            Arc::new(NoopMailer),
            Arc::new(JwtTokenService::from_env()),
        )
    }

    fn memory_repos() -> (
        Arc<dyn UserRepository>,
        Arc<dyn PostRepository>,
        Arc<dyn CommentRepository>,
    ) {
        (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryCommentRepository::new()),
        )
    }

    fn assemble(
        config: AppConfig,
        (users, posts, comments): (
            Arc<dyn UserRepository>,
            Arc<dyn PostRepository>,
            Arc<dyn CommentRepository>,
        ),
        media: Arc<dyn MediaStore>,
        mailer: Arc<dyn VerificationMailer>,
        token_service: Arc<dyn TokenService>,
    ) -> Self {
        let post_service = PostService::new(posts, comments, users.clone(), media.clone());
        let account_service = UserService::new(
            users,
            media,
            mailer,
            Arc::new(Argon2PasswordService::new()),
            token_service.clone(),
        );

        tracing::info!("Application state initialized");

        Self {
            config,
            posts: post_service,
            accounts: account_service,
            token_service,
        }
    }
}
