//! Post handlers: CRUD, listing, likes and comments.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use quill_core::domain::PostStatus;
use quill_core::ports::PostQuery;
use quill_core::services::{NewPost, PostPatch};
use quill_shared::dto::{CommentView, LikeResponse, NewCommentRequest, Paginated, PostView};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload::{FormFile, read_form};

const DEFAULT_PAGE_SIZE: u64 = 8;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub author: Option<Uuid>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn parse_status(raw: &str) -> Result<PostStatus, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid status.".to_string()))
}

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListParams>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let filter = PostQuery {
        status,
        category: params.category.filter(|s| !s.is_empty()),
        tag: params.tag.filter(|s| !s.is_empty()),
        author: params.author,
        q: params.q.filter(|s| !s.is_empty()),
    };

    let page = state
        .posts
        .list(
            &filter,
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;

    let viewer = viewer.viewer();
    let items: Vec<PostView> = page
        .items
        .iter()
        .map(|p| PostView::project(p, viewer))
        .collect();
    Ok(HttpResponse::Ok().json(Paginated {
        items,
        page: page.page,
        limit: page.limit,
        total: page.total,
        total_pages: page.total_pages,
    }))
}

/// GET /api/posts/{slug}
pub async fn get(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = state.posts.get(&slug).await?;
    Ok(HttpResponse::Ok().json(PostView::project(&post, viewer.viewer())))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "image").await?;
    let image = form.file.take().map(FormFile::into_upload);

    let status = match form.text("status").filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let input = NewPost {
        title: form.text("title").unwrap_or_default().to_string(),
        slug: form.text("slug").unwrap_or_default().to_string(),
        content: form.text("content").unwrap_or_default().to_string(),
        status,
        category: form.text("category").map(str::to_string),
        tags: form.text("tags").map(str::to_string),
        image,
    };

    let actor = identity.actor();
    let post = state.posts.create(&actor, input).await?;
    Ok(HttpResponse::Ok().json(PostView::project(&post, Some(actor.id))))
}

/// PUT /api/posts/{slug}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "image").await?;
    let image = form.file.take().map(FormFile::into_upload);

    let status = match form.text("status").filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let patch = PostPatch {
        title: form.text("title").map(str::to_string),
        content: form.text("content").map(str::to_string),
        status,
        category: form.text("category").map(str::to_string),
        tags: form.text("tags").map(str::to_string),
        image,
    };

    let actor = identity.actor();
    let post = state.posts.update(&actor, &slug, patch).await?;
    Ok(HttpResponse::Ok().json(PostView::project(&post, Some(actor.id))))
}

/// DELETE /api/posts/{slug}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.posts.delete(&identity.actor(), &slug).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// GET /api/posts/{slug}/comments
pub async fn comments(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let comments = state.posts.comments(&slug).await?;
    let views: Vec<CommentView> = comments
        .iter()
        .map(|c| CommentView::new(&c.comment, c.author_id, &c.author_name))
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// POST /api/posts/{slug}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
    body: web::Json<NewCommentRequest>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let comment = state
        .posts
        .add_comment(&actor, &slug, &body.content)
        .await?;
    Ok(HttpResponse::Ok().json(CommentView::new(&comment, actor.id, &actor.name)))
}

/// DELETE /api/posts/{slug}/comments/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(String, Uuid)>,
) -> AppResult<HttpResponse> {
    let (slug, comment_id) = path.into_inner();
    state
        .posts
        .delete_comment(&identity.actor(), &slug, comment_id)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// POST /api/posts/{slug}/likes
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let post = state.posts.like(&actor, &slug).await?;
    Ok(HttpResponse::Ok().json(LikeResponse {
        likes_count: post.likes.len() as u64,
        liked_by_me: post.likes.contains(actor.id),
    }))
}

/// DELETE /api/posts/{slug}/likes
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let post = state.posts.unlike(&actor, &slug).await?;
    Ok(HttpResponse::Ok().json(LikeResponse {
        likes_count: post.likes.len() as u64,
        liked_by_me: post.likes.contains(actor.id),
    }))
}
