//! Post operations: ownership-checked CRUD, filtered listing, like toggling
//! and the comment lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus, parse_tags};
use crate::error::DomainError;
use crate::ports::{CommentRepository, MediaStore, PostQuery, PostRepository, UserRepository};

use super::{Actor, ImageUpload, total_pages};

const POST_IMAGE_NAMESPACE: &str = "posts";

/// Input for post creation.
#[derive(Debug, Default)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    /// Comma-separated tag string, as submitted by the client.
    pub tags: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Partial update for a post. Absent fields are left unchanged; an explicit
/// empty string clears the field.
#[derive(Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub image: Option<ImageUpload>,
}

/// One page of a filtered post listing.
#[derive(Debug)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// A comment joined with its author's public identity.
#[derive(Debug)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author_id: Uuid,
    pub author_name: String,
}

/// Post service. Owns the slug-uniqueness, ownership and like-set invariants.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            users,
            media,
        }
    }

    /// Create a post owned by the actor. The slug is lowercased before the
    /// uniqueness check and stored lowercased.
    pub async fn create(&self, actor: &Actor, input: NewPost) -> Result<Post, DomainError> {
        if input.title.trim().is_empty()
            || input.slug.trim().is_empty()
            || input.content.is_empty()
        {
            return Err(DomainError::Validation(
                "Title, slug, and content are required.".to_string(),
            ));
        }

        let slug = input.slug.trim().to_lowercase();
        if self.posts.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::Conflict("Slug already exists.".to_string()));
        }

        let mut post = Post::new(actor.id, input.title, slug, input.content);
        if let Some(status) = input.status {
            post.status = status;
        }
        if let Some(category) = input.category {
            post.category = category;
        }
        if let Some(tags) = input.tags {
            post.tags = parse_tags(&tags);
        }

        // Image upload is a critical step: an upstream failure aborts the
        // create with nothing persisted.
        if let Some(image) = input.image {
            let stored = self
                .media
                .store(&image.bytes, &image.filename, POST_IMAGE_NAMESPACE)
                .await
                .map_err(|e| DomainError::Upstream(e.to_string()))?;
            post.featured_image = stored.url;
            post.featured_image_handle = stored.handle;
        }

        Ok(self.posts.insert(post).await?)
    }

    /// Apply a partial update. Only the owner may update; the slug is
    /// immutable and absent patch fields are left untouched.
    pub async fn update(
        &self,
        actor: &Actor,
        slug: &str,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        if post.owner_id != actor.id {
            return Err(DomainError::Forbidden);
        }

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(status) = patch.status {
            post.status = status;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(tags) = patch.tags {
            post.tags = parse_tags(&tags);
        }

        if let Some(image) = patch.image {
            // Release the old image first; release is best-effort and cannot
            // fail the update.
            self.media.release(&post.featured_image_handle).await;
            let stored = self
                .media
                .store(&image.bytes, &image.filename, POST_IMAGE_NAMESPACE)
                .await
                .map_err(|e| DomainError::Upstream(e.to_string()))?;
            post.featured_image = stored.url;
            post.featured_image_handle = stored.handle;
        }

        post.touch();
        Ok(self.posts.save(post).await?)
    }

    /// Delete a post and cascade to its comments. The post row is removed
    /// first; image release and comment cleanup are advisory and re-runnable.
    pub async fn delete(&self, actor: &Actor, slug: &str) -> Result<(), DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        if post.owner_id != actor.id {
            return Err(DomainError::Forbidden);
        }

        self.posts.delete(post.id).await?;
        self.media.release(&post.featured_image_handle).await;

        match self.comments.delete_by_post(post.id).await {
            Ok(removed) => {
                tracing::debug!(slug = %post.slug, removed, "deleted post comments");
            }
            Err(e) => {
                tracing::warn!(slug = %post.slug, error = %e, "comment cleanup failed");
            }
        }

        Ok(())
    }

    /// Fetch a post by slug. Every successful fetch increments the view
    /// counter by exactly one.
    pub async fn get(&self, slug: &str) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        post.views += 1;
        Ok(self.posts.save(post).await?)
    }

    /// Filtered, paginated listing, newest first. Does not touch view counts.
    pub async fn list(
        &self,
        query: &PostQuery,
        page: u64,
        limit: u64,
    ) -> Result<PostPage, DomainError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let (items, total) = self.posts.list(query, page, limit).await?;
        Ok(PostPage {
            items,
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        })
    }

    /// Add the actor to the post's like set. Idempotent: liking twice leaves
    /// the set unchanged and still succeeds.
    pub async fn like(&self, actor: &Actor, slug: &str) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        if post.likes.insert(actor.id) {
            post.touch();
            post = self.posts.save(post).await?;
        }
        Ok(post)
    }

    /// Remove the actor from the like set. Idempotent removal.
    pub async fn unlike(&self, actor: &Actor, slug: &str) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        if post.likes.remove(actor.id) {
            post.touch();
            post = self.posts.save(post).await?;
        }
        Ok(post)
    }

    /// All comments on a post, newest first, joined with author identities.
    /// Comments whose author can no longer be resolved are skipped.
    pub async fn comments(&self, slug: &str) -> Result<Vec<CommentWithAuthor>, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;

        let comments = self.comments.list_by_post(post.id).await?;
        let mut out = Vec::with_capacity(comments.len());
        for comment in comments {
            match self.users.find_by_id(comment.author_id).await? {
                Some(author) => out.push(CommentWithAuthor {
                    author_id: author.id,
                    author_name: author.name,
                    comment,
                }),
                None => {
                    tracing::debug!(comment_id = %comment.id, "skipping comment with unknown author");
                }
            }
        }
        Ok(out)
    }

    /// Add a comment to an existing post on behalf of the actor.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        slug: &str,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let post = self
            .posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        if content.trim().is_empty() {
            return Err(DomainError::Validation("Comment is required.".to_string()));
        }

        let comment = Comment::new(post.id, actor.id, content.to_string());
        Ok(self.comments.insert(comment).await?)
    }

    /// Delete a comment. Only its author may delete it.
    pub async fn delete_comment(
        &self,
        actor: &Actor,
        slug: &str,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("Post"))?;
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound("Comment"))?;
        if comment.author_id != actor.id {
            return Err(DomainError::Forbidden);
        }

        Ok(self.comments.delete(comment.id).await?)
    }
}
