use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - identity record with profile, verification state and bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercased; unique across users.
    pub email: String,
    /// Unique across users.
    pub phone: String,
    pub password_hash: String,
    pub avatar_url: String,
    /// Deletion handle for the avatar image; empty when no avatar is set.
    pub avatar_handle: String,
    pub description: String,
    pub dob: Option<NaiveDate>,
    pub is_email_verified: bool,
    /// Single active verification token, cleared once used.
    pub verification_token: Option<String>,
    pub verification_expires: Option<DateTime<Utc>>,
    /// Bookmarked post slugs, insertion-ordered, duplicates forbidden.
    pub bookmarks: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated id and timestamps.
    pub fn new(name: String, email: String, phone: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            password_hash,
            avatar_url: String::new(),
            avatar_handle: String::new(),
            description: String::new(),
            dob: None,
            is_email_verified: false,
            verification_token: None,
            verification_expires: None,
            bookmarks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bookmark a post slug. Returns false when it was already bookmarked.
    pub fn add_bookmark(&mut self, slug: &str) -> bool {
        if self.bookmarks.iter().any(|s| s == slug) {
            return false;
        }
        self.bookmarks.push(slug.to_string());
        true
    }

    /// Remove a bookmarked slug. Returns false when it was not bookmarked.
    pub fn remove_bookmark(&mut self, slug: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|s| s != slug);
        self.bookmarks.len() != before
    }

    /// Install a fresh verification token and mark the email unverified.
    pub fn reset_verification(&mut self, token: String, expires: DateTime<Utc>) {
        self.is_email_verified = false;
        self.verification_token = Some(token);
        self.verification_expires = Some(expires);
    }

    /// Consume the active token: verified, nothing left to redeem.
    pub fn mark_verified(&mut self) {
        self.is_email_verified = true;
        self.verification_token = None;
        self.verification_expires = None;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            "Ada".into(),
            "ada@example.com".into(),
            "555-0100".into(),
            "hash".into(),
        )
    }

    #[test]
    fn bookmarks_are_a_set() {
        let mut u = user();
        assert!(u.add_bookmark("first-post"));
        assert!(!u.add_bookmark("first-post"));
        assert_eq!(u.bookmarks, vec!["first-post".to_string()]);

        assert!(u.remove_bookmark("first-post"));
        assert!(!u.remove_bookmark("first-post"));
        assert!(u.bookmarks.is_empty());
    }

    #[test]
    fn verification_reset_and_redeem() {
        let mut u = user();
        u.mark_verified();
        assert!(u.is_email_verified);

        u.reset_verification("tok".into(), Utc::now());
        assert!(!u.is_email_verified);
        assert_eq!(u.verification_token.as_deref(), Some("tok"));

        u.mark_verified();
        assert!(u.is_email_verified);
        assert!(u.verification_token.is_none());
        assert!(u.verification_expires.is_none());
    }
}
