//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use quill_core::domain::{Comment, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{CommentRepository, PostQuery, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Map a write error, turning unique-index rejections into a constraint
/// violation with a caller-facing message.
fn write_err(e: DbErr, constraint_msg: &str) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(constraint_msg.to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository.
pub struct PgUserRepository {
    db: DbConn,
}

impl PgUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Phone.eq(phone))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = user.into();
        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Email or phone already in use."))?;
        Ok(saved.into())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = user.into();
        let saved = model
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Email or phone already in use."))?;
        Ok(saved.into())
    }

    async fn search(
        &self,
        q: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<User>, u64), RepoError> {
        let mut select = UserEntity::find();
        if let Some(q) = q.filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            select = select.filter(
                Condition::any()
                    .add(Expr::cust_with_values("name ILIKE ?", [pattern.clone()]))
                    .add(Expr::cust_with_values("email ILIKE ?", [pattern.clone()]))
                    .add(Expr::cust_with_values("description ILIKE ?", [pattern])),
            );
        }

        let paginator = select
            .order_by_desc(user::Column::CreatedAt)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await.map_err(query_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(query_err)?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }
}

/// PostgreSQL post repository.
pub struct PgPostRepository {
    db: DbConn,
}

impl PgPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let model: post::ActiveModel = post.into();
        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Slug already exists."))?;
        Ok(saved.into())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let model: post::ActiveModel = post.into();
        let saved = model
            .update(&self.db)
            .await
            .map_err(|e| write_err(e, "Slug already exists."))?;
        Ok(saved.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        query: &PostQuery,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<Post>, u64), RepoError> {
        let mut select = PostEntity::find();

        if let Some(status) = query.status {
            select = select.filter(post::Column::Status.eq(status.to_string()));
        }
        if let Some(category) = &query.category {
            select = select.filter(post::Column::Category.eq(category.clone()));
        }
        if let Some(tag) = &query.tag {
            select = select.filter(Expr::cust_with_values("? = ANY(tags)", [tag.clone()]));
        }
        if let Some(author) = query.author {
            select = select.filter(post::Column::OwnerId.eq(author));
        }
        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            // Matches the GIN index created by the migration.
            select = select.filter(Expr::cust_with_values(
                "to_tsvector('english', title || ' ' || content || ' ' || category || ' ' || \
                 array_to_string(tags, ' ')) @@ plainto_tsquery('english', ?)",
                [q.to_string()],
            ));
        }

        let paginator = select
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, limit);
        let total = paginator.num_items().await.map_err(query_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(query_err)?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }
}

/// PostgreSQL comment repository.
pub struct PgCommentRepository {
    db: DbConn,
}

impl PgCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let model: comment::ActiveModel = comment.into();
        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err(e, "Comment already exists."))?;
        Ok(saved.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = CommentEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let result = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected)
    }
}
