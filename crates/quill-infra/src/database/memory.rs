//! In-memory repository implementations - used as fallback when the database
//! is not configured, and by the service-level test suite.
//!
//! The unique checks here mirror the Postgres unique indexes, so the
//! constraint backstop behaves the same in both stores. Data is lost on
//! process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostQuery, PostRepository, UserRepository};

fn page_slice<T>(mut items: Vec<T>, page: u64, limit: u64) -> (Vec<T>, u64) {
    let total = items.len() as u64;
    let start = ((page - 1) * limit).min(total) as usize;
    let end = (start + limit as usize).min(items.len());
    items.truncate(end);
    (items.split_off(start), total)
}

/// Lowercased alphanumeric word tokens of a string.
fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Word-level text match: any query term equal to some token of the post's
/// title, content, category or tags. Deliberately not a substring match.
fn matches_text(post: &Post, q: &str) -> bool {
    let mut haystack = tokens(&post.title);
    haystack.extend(tokens(&post.content));
    haystack.extend(tokens(&post.category));
    for tag in &post.tags {
        haystack.extend(tokens(tag));
    }

    tokens(q).iter().any(|term| haystack.contains(term))
}

/// In-memory user repository.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.phone == phone).cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .find(|u| u.verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::Constraint("Email already in use.".to_string()));
        }
        if store.values().any(|u| u.phone == user.phone) {
            return Err(RepoError::Constraint("Phone already in use.".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        if store
            .values()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::Constraint("Email already in use.".to_string()));
        }
        if store
            .values()
            .any(|u| u.id != user.id && u.phone == user.phone)
        {
            return Err(RepoError::Constraint("Phone already in use.".to_string()));
        }
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn search(
        &self,
        q: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<User>, u64), RepoError> {
        let store = self.store.read().await;
        let mut matches: Vec<User> = store
            .values()
            .filter(|u| match q.filter(|q| !q.is_empty()) {
                Some(q) => {
                    let q = q.to_lowercase();
                    u.name.to_lowercase().contains(&q)
                        || u.email.to_lowercase().contains(&q)
                        || u.description.to_lowercase().contains(&q)
                }
                None => true,
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(page_slice(matches, page, limit))
    }
}

/// In-memory post repository.
#[derive(Default)]
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|p| p.slug == slug).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("Slug already exists.".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;
        if store.values().any(|p| p.id != post.id && p.slug == post.slug) {
            return Err(RepoError::Constraint("Slug already exists.".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn list(
        &self,
        query: &PostQuery,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let store = self.store.read().await;
        let mut matches: Vec<Post> = store
            .values()
            .filter(|p| {
                query.status.is_none_or(|s| p.status == s)
                    && query.category.as_ref().is_none_or(|c| &p.category == c)
                    && query.tag.as_ref().is_none_or(|t| p.tags.contains(t))
                    && query.author.is_none_or(|a| p.owner_id == a)
                    && query
                        .q
                        .as_deref()
                        .filter(|q| !q.is_empty())
                        .is_none_or(|q| matches_text(p, q))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(page_slice(matches, page, limit))
    }
}

/// In-memory comment repository.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    store: RwLock<HashMap<Uuid, Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments)
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut store = self.store.write().await;
        store.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, c| c.post_id != post_id);
        Ok((before - store.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_slice_clamps_out_of_range_pages() {
        let items: Vec<u32> = (0..5).collect();

        let (page1, total) = page_slice(items.clone(), 1, 2);
        assert_eq!(page1, vec![0, 1]);
        assert_eq!(total, 5);

        let (page3, _) = page_slice(items.clone(), 3, 2);
        assert_eq!(page3, vec![4]);

        let (page9, total) = page_slice(items, 9, 2);
        assert!(page9.is_empty());
        assert_eq!(total, 5);
    }

    #[test]
    fn text_match_is_word_level_not_substring() {
        let mut post = Post::new(
            Uuid::new_v4(),
            "Rust rocks".into(),
            "rust-rocks".into(),
            "Fearless concurrency".into(),
        );
        post.category = "systems".into();
        post.tags = vec!["async".into()];

        assert!(matches_text(&post, "rust"));
        assert!(matches_text(&post, "CONCURRENCY"));
        assert!(matches_text(&post, "async"));
        assert!(matches_text(&post, "systems"));
        // Any-term semantics: one matching word is enough.
        assert!(matches_text(&post, "rust python"));

        assert!(!matches_text(&post, "rus"));
        assert!(!matches_text(&post, "rock"));
        assert!(!matches_text(&post, "go"));
    }
}
