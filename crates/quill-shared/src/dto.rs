//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, PostStatus, User};

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to redeem an email-verification token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Request to add a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentRequest {
    pub content: String,
}

/// Public projection of a post. `id` is the slug, the post's public
/// identifier; `likes_count` and `liked_by_me` are derived at read time from
/// the like set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: String,
    pub category: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub views: i64,
    pub likes_count: u64,
    pub liked_by_me: bool,
    pub owner_id: String,
}

impl PostView {
    /// Project a post for a (possibly anonymous) viewer.
    pub fn project(post: &Post, viewer: Option<Uuid>) -> Self {
        Self {
            id: post.slug.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            featured_image: post.featured_image.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            status: post.status,
            views: post.views,
            likes_count: post.likes.len() as u64,
            liked_by_me: viewer.is_some_and(|v| post.likes.contains(v)),
            owner_id: post.owner_id.to_string(),
        }
    }
}

/// Private projection of a user, returned to the account owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar_url: String,
    pub description: String,
    pub dob: Option<NaiveDate>,
    pub is_email_verified: bool,
    pub bookmarks: Vec<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar_url: user.avatar_url.clone(),
            description: user.description.clone(),
            dob: user.dob,
            is_email_verified: user.is_email_verified,
            bookmarks: user.bookmarks.clone(),
        }
    }
}

/// Public projection of an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
    pub description: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            description: user.description.clone(),
        }
    }
}

/// Response containing a bearer token and the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Projection of a comment with its author's public identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: CommentAuthor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: String,
    pub name: String,
}

impl CommentView {
    pub fn new(comment: &Comment, author_id: Uuid, author_name: &str) -> Self {
        Self {
            id: comment.id.to_string(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            author: CommentAuthor {
                id: author_id.to_string(),
                name: author_name.to_string(),
            },
        }
    }
}

/// One page of a listing, with the totals the pagination contract promises.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// The actor's current bookmark list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarksResponse {
    pub bookmarks: Vec<String>,
}

/// Like toggle result: derived fields only, the membership stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes_count: u64,
    pub liked_by_me: bool,
}

/// A bare human-readable outcome message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_view_uses_slug_as_id_and_derives_like_fields() {
        let owner = Uuid::new_v4();
        let fan = Uuid::new_v4();
        let mut post = Post::new(owner, "Hi".into(), "hi".into(), "x".into());
        post.likes.insert(fan);

        let anonymous = PostView::project(&post, None);
        assert_eq!(anonymous.id, "hi");
        assert_eq!(anonymous.likes_count, 1);
        assert!(!anonymous.liked_by_me);

        let as_fan = PostView::project(&post, Some(fan));
        assert!(as_fan.liked_by_me);

        let json = serde_json::to_value(&as_fan).unwrap();
        assert_eq!(json["likesCount"], 1);
        assert_eq!(json["likedByMe"], true);
        assert_eq!(json["ownerId"], owner.to_string());
        assert_eq!(json["status"], "active");
    }
}
