use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Inactive,
    Draft,
}

impl Default for PostStatus {
    fn default() -> Self {
        PostStatus::Active
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PostStatus::Active => "active",
            PostStatus::Inactive => "inactive",
            PostStatus::Draft => "draft",
        };
        f.write_str(s)
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PostStatus::Active),
            "inactive" => Ok(PostStatus::Inactive),
            "draft" => Ok(PostStatus::Draft),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// The set of user ids that have liked a post.
///
/// Membership is the source of truth; insert and remove are idempotent, so a
/// repeated like or unlike from the same user never changes the count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeSet(Vec<Uuid>);

impl LikeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a user to the set. Returns false when the user was already present.
    pub fn insert(&mut self, user_id: Uuid) -> bool {
        if self.0.contains(&user_id) {
            return false;
        }
        self.0.push(user_id);
        true
    }

    /// Remove a user from the set. Returns false when the user was not present.
    pub fn remove(&mut self, user_id: Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|id| *id != user_id);
        self.0.len() != before
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.0.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Uuid>> for LikeSet {
    fn from(mut ids: Vec<Uuid>) -> Self {
        // Stored data may predate the set abstraction; drop duplicates on load.
        let mut seen = Vec::with_capacity(ids.len());
        ids.retain(|id| {
            if seen.contains(id) {
                false
            } else {
                seen.push(*id);
                true
            }
        });
        Self(ids)
    }
}

impl From<LikeSet> for Vec<Uuid> {
    fn from(set: LikeSet) -> Self {
        set.0
    }
}

/// Parse a comma-separated tag string: trimmed, empties dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Post entity - a blog post addressed publicly by its slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// URL-safe, globally unique, immutable lowercase identifier.
    pub slug: String,
    pub content: String,
    pub featured_image: String,
    /// Deletion handle for the featured image; empty when no image is set.
    pub featured_image_handle: String,
    pub status: PostStatus,
    pub category: String,
    pub tags: Vec<String>,
    pub views: i64,
    pub likes: LikeSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with generated id, default status and timestamps.
    pub fn new(owner_id: Uuid, title: String, slug: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title,
            slug,
            content,
            featured_image: String::new(),
            featured_image_handle: String::new(),
            status: PostStatus::Active,
            category: String::new(),
            tags: Vec::new(),
            views: 0,
            likes: LikeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_set_insert_is_idempotent() {
        let user = Uuid::new_v4();
        let mut likes = LikeSet::new();

        assert!(likes.insert(user));
        assert!(!likes.insert(user));
        assert_eq!(likes.len(), 1);
        assert!(likes.contains(user));
    }

    #[test]
    fn like_set_remove_of_absent_user_is_noop() {
        let mut likes = LikeSet::new();
        likes.insert(Uuid::new_v4());

        assert!(!likes.remove(Uuid::new_v4()));
        assert_eq!(likes.len(), 1);
    }

    #[test]
    fn like_set_dedupes_on_load() {
        let user = Uuid::new_v4();
        let likes = LikeSet::from(vec![user, user, Uuid::new_v4()]);
        assert_eq!(likes.len(), 2);
    }

    #[test]
    fn parse_tags_trims_and_drops_empties() {
        assert_eq!(
            parse_tags(" rust, web , ,blog,"),
            vec!["rust".to_string(), "web".to_string(), "blog".to_string()]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [PostStatus::Active, PostStatus::Inactive, PostStatus::Draft] {
            assert_eq!(status.to_string().parse::<PostStatus>().unwrap(), status);
        }
        assert!("published".parse::<PostStatus>().is_err());
    }
}
