//! Application services - the business operations exposed to the transport
//! layer. Every operation that acts on behalf of a caller takes an explicit
//! [`Actor`] rather than reading ambient request state.

pub mod posts;
pub mod users;

pub use posts::{CommentWithAuthor, NewPost, PostPage, PostPatch, PostService};
pub use users::{AuthorPage, ProfilePatch, Session, Signup, UserService};

use uuid::Uuid;

/// The authenticated caller of an operation, decoded from a bearer token.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// An image buffer handed in by the transport layer.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Page count for a result set: ceil(total/limit), but never below 1 so an
/// empty listing still renders as a single empty page.
pub(crate) fn total_pages(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit).max(1)
}

#[cfg(test)]
mod tests {
    use super::total_pages;

    #[test]
    fn total_pages_is_ceil_with_floor_of_one() {
        assert_eq!(total_pages(0, 8), 1);
        assert_eq!(total_pages(1, 8), 1);
        assert_eq!(total_pages(8, 8), 1);
        assert_eq!(total_pages(9, 8), 2);
        assert_eq!(total_pages(17, 8), 3);
        assert_eq!(total_pages(100, 1), 100);
    }
}
