use sea_orm::{DatabaseBackend, MockDatabase};

use quill_core::domain::Post;
use quill_core::ports::PostRepository;

use crate::database::entity::post;
use crate::database::postgres_repo::PgPostRepository;

#[tokio::test]
async fn test_find_post_by_slug() {
    let post_id = uuid::Uuid::new_v4();
    let owner_id = uuid::Uuid::new_v4();
    let liker = uuid::Uuid::new_v4();
    let now = chrono::Utc::now();

    // Mock the query expectation
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            owner_id,
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            content: "Content".to_owned(),
            featured_image: String::new(),
            featured_image_handle: String::new(),
            status: "active".to_owned(),
            category: "news".to_owned(),
            tags: vec!["rust".to_owned()],
            views: 3,
            likes: vec![liker],
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PgPostRepository::new(db);

    let result: Option<Post> = repo.find_by_slug("test-post").await.unwrap();

    assert!(result.is_some());
    let post = result.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.slug, "test-post");
    assert_eq!(post.views, 3);
    assert_eq!(post.likes.len(), 1);
    assert!(post.likes.contains(liker));
}
