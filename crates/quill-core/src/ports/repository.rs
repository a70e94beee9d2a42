use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus, User};
use crate::error::RepoError;

/// User repository - identity lookups plus paginated author search.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// Lookup by (already lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, RepoError>;

    /// Lookup by the active email-verification token.
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    /// Persist a new user. The store's unique indexes on email and phone are
    /// the last line of defense against a concurrent duplicate signup.
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    /// Persist changes to an existing user.
    async fn save(&self, user: User) -> Result<User, RepoError>;

    /// Case-insensitive search over name, email and description, newest
    /// first. Returns the page of users plus the total match count.
    async fn search(
        &self,
        q: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<User>, u64), RepoError>;
}

/// Filter for post listing. All fields combine conjunctively.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    /// Matches posts whose tag list contains this tag.
    pub tag: Option<String>,
    pub author: Option<Uuid>,
    /// Word-level text match over title, content, tags and category.
    pub q: Option<String>,
}

/// Post repository - slug-addressed lookups and filtered listing.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Persist a new post. The unique index on slug backs up the
    /// check-then-insert sequence in the service layer.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Persist changes to an existing post.
    async fn save(&self, post: Post) -> Result<Post, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Filtered listing, newest first. Returns the requested page plus the
    /// total match count ignoring pagination.
    async fn list(
        &self,
        query: &PostQuery,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// All comments on a post, newest first.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Remove every comment on a post; returns how many were removed.
    /// Re-runnable, so a failed cascade can be retried later.
    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
