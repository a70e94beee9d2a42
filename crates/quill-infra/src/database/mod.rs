//! Database connection management and repository implementations.

mod connections;
pub mod entity;
pub mod memory;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use memory::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use postgres_repo::{PgCommentRepository, PgPostRepository, PgUserRepository};

#[cfg(test)]
mod tests;
