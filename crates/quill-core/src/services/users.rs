//! User operations: signup/login, uniqueness enforcement, profile mutation,
//! the email-verification state machine and bookmark toggling.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::domain::User;
use crate::error::DomainError;
use crate::ports::{
    MediaStore, PasswordService, TokenService, UserRepository, VerificationMailer,
};

use super::{ImageUpload, total_pages};

const AVATAR_NAMESPACE: &str = "avatars";
const VERIFICATION_TTL_HOURS: i64 = 24;

/// Input for signup. The avatar is required.
#[derive(Debug, Default)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub description: Option<String>,
    pub dob: Option<NaiveDate>,
    pub avatar: Option<ImageUpload>,
}

/// Partial profile update. `dob` uses a nested Option so that a present but
/// empty value clears the stored date.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dob: Option<Option<NaiveDate>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageUpload>,
}

/// An authenticated session: bearer token plus the user it belongs to.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// One page of an author listing.
#[derive(Debug)]
pub struct AuthorPage {
    pub items: Vec<User>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// User service. Owns the email/phone uniqueness and verification invariants.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    media: Arc<dyn MediaStore>,
    mailer: Arc<dyn VerificationMailer>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        media: Arc<dyn MediaStore>,
        mailer: Arc<dyn VerificationMailer>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            media,
            mailer,
            passwords,
            tokens,
        }
    }

    /// Register a new user. Email is normalized to lowercase and checked for
    /// uniqueness before phone; when both collide only the email conflict is
    /// reported. A verification email is attempted but its failure never
    /// rolls the signup back.
    pub async fn signup(&self, input: Signup, origin: &str) -> Result<Session, DomainError> {
        if input.name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
            || input.phone.trim().is_empty()
        {
            return Err(DomainError::Validation(
                "Name, email, password, and phone are required.".to_string(),
            ));
        }
        let Some(avatar) = input.avatar else {
            return Err(DomainError::Validation(
                "Profile photo is required.".to_string(),
            ));
        };

        let email = input.email.trim().to_lowercase();
        let phone = input.phone.trim().to_string();
        if !is_valid_email(&email) {
            return Err(DomainError::Validation(
                "Please enter a valid email address.".to_string(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::Conflict("Email already in use.".to_string()));
        }
        if self.users.find_by_phone(&phone).await?.is_some() {
            return Err(DomainError::Conflict("Phone already in use.".to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        // Critical upstream step: abort before anything is persisted.
        let stored = self
            .media
            .store(&avatar.bytes, &avatar.filename, AVATAR_NAMESPACE)
            .await
            .map_err(|e| DomainError::Upstream(e.to_string()))?;

        let mut user = User::new(input.name.trim().to_string(), email, phone, password_hash);
        user.avatar_url = stored.url;
        user.avatar_handle = stored.handle;
        user.description = input.description.unwrap_or_default();
        user.dob = input.dob;
        user.reset_verification(
            verification_token(),
            Utc::now() + TimeDelta::hours(VERIFICATION_TTL_HOURS),
        );

        let user = self.users.insert(user).await?;

        self.try_send_verification(&user, origin).await;

        let token = self
            .tokens
            .generate_token(user.id, &user.email, &user.name)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(Session { token, user })
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(
                "Email and password are required.".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let matches = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !matches {
            return Err(DomainError::Unauthorized);
        }

        let token = self
            .tokens
            .generate_token(user.id, &user.email, &user.name)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(Session { token, user })
    }

    /// Fetch the authenticated user's record.
    pub async fn me(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    /// Apply a partial profile update. Changing the email re-validates its
    /// shape, re-checks uniqueness and always resets the verification state:
    /// a changed address is unverified by definition. Changing the phone
    /// checks uniqueness only.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        patch: ProfilePatch,
        origin: &str,
    ) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(description) = patch.description {
            user.description = description;
        }
        if let Some(dob) = patch.dob {
            user.dob = dob;
        }

        if let Some(email) = patch.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                if !is_valid_email(&email) {
                    return Err(DomainError::Validation(
                        "Please enter a valid email address.".to_string(),
                    ));
                }
                // The new address differs from the user's own unique email,
                // so any hit belongs to someone else.
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(DomainError::Conflict("Email already in use.".to_string()));
                }
                user.email = email;
                user.reset_verification(
                    verification_token(),
                    Utc::now() + TimeDelta::hours(VERIFICATION_TTL_HOURS),
                );
            }
        }

        if let Some(phone) = patch.phone {
            let phone = phone.trim().to_string();
            if phone != user.phone {
                if self.users.find_by_phone(&phone).await?.is_some() {
                    return Err(DomainError::Conflict("Phone already in use.".to_string()));
                }
                user.phone = phone;
            }
        }

        if let Some(avatar) = patch.avatar {
            self.media.release(&user.avatar_handle).await;
            let stored = self
                .media
                .store(&avatar.bytes, &avatar.filename, AVATAR_NAMESPACE)
                .await
                .map_err(|e| DomainError::Upstream(e.to_string()))?;
            user.avatar_url = stored.url;
            user.avatar_handle = stored.handle;
        }

        user.touch();
        let user = self.users.save(user).await?;

        if !user.is_email_verified && user.verification_token.is_some() {
            self.try_send_verification(&user, origin).await;
        }

        Ok(user)
    }

    /// Redeem a verification token. Fails when no user holds the token with
    /// an unexpired expiry.
    pub async fn verify_email(&self, token: &str) -> Result<User, DomainError> {
        if token.is_empty() {
            return Err(DomainError::Validation(
                "Verification token is required.".to_string(),
            ));
        }

        let user = self.users.find_by_verification_token(token).await?;
        let mut user = match user {
            Some(u) if u.verification_expires.is_some_and(|exp| exp > Utc::now()) => u,
            _ => {
                return Err(DomainError::Validation(
                    "Invalid or expired token.".to_string(),
                ));
            }
        };

        user.mark_verified();
        user.touch();
        Ok(self.users.save(user).await?)
    }

    /// Rotate the verification token and re-send the email. Returns false
    /// when the address is already verified (nothing to do). Unlike signup,
    /// the send here is the whole point of the call, so its failure
    /// propagates.
    pub async fn resend_verification(
        &self,
        user_id: Uuid,
        origin: &str,
    ) -> Result<bool, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;
        if user.is_email_verified {
            return Ok(false);
        }

        user.reset_verification(
            verification_token(),
            Utc::now() + TimeDelta::hours(VERIFICATION_TTL_HOURS),
        );
        user.touch();
        let user = self.users.save(user).await?;

        let token = user.verification_token.as_deref().unwrap_or_default();
        self.mailer
            .send_verification(&user.email, &user.name, token, origin)
            .await
            .map_err(|e| DomainError::Upstream(e.to_string()))?;
        Ok(true)
    }

    /// Public author lookup.
    pub async fn get_author(&self, id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("User"))
    }

    /// Paginated author search, newest first.
    pub async fn list_authors(
        &self,
        q: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<AuthorPage, DomainError> {
        let page = page.max(1);
        let limit = limit.max(1);

        let (items, total) = self.users.search(q, page, limit).await?;
        Ok(AuthorPage {
            items,
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        })
    }

    /// The actor's bookmarked slugs.
    pub async fn bookmarks(&self, user_id: Uuid) -> Result<Vec<String>, DomainError> {
        Ok(self.me(user_id).await?.bookmarks)
    }

    /// Bookmark a slug. Idempotent: re-bookmarking is a no-op that still
    /// returns the current list. The slug is held by value, not by foreign
    /// key, so it may dangle after the post is deleted.
    pub async fn add_bookmark(
        &self,
        user_id: Uuid,
        slug: &str,
    ) -> Result<Vec<String>, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;
        if user.add_bookmark(slug) {
            user.touch();
            user = self.users.save(user).await?;
        }
        Ok(user.bookmarks)
    }

    /// Remove a bookmarked slug. Idempotent removal.
    pub async fn remove_bookmark(
        &self,
        user_id: Uuid,
        slug: &str,
    ) -> Result<Vec<String>, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("User"))?;
        if user.remove_bookmark(slug) {
            user.touch();
            user = self.users.save(user).await?;
        }
        Ok(user.bookmarks)
    }

    async fn try_send_verification(&self, user: &User, origin: &str) {
        let token = user.verification_token.as_deref().unwrap_or_default();
        if let Err(e) = self
            .mailer
            .send_verification(&user.email, &user.name, token, origin)
            .await
        {
            tracing::warn!(error = %e, "verification email send failed");
        }
    }
}

/// Basic `local@domain.tld` shape check, no whitespace anywhere.
fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2
}

/// 32 random bytes, hex-encoded. Single-use, held by at most one user.
fn verification_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, verification_token};

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@missing-local.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@.com"));
    }

    #[test]
    fn verification_tokens_are_long_and_unique() {
        let a = verification_token();
        let b = verification_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
