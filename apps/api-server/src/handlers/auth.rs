//! Account handlers: signup, login, profile, verification, authors and
//! bookmarks.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use quill_core::services::{ProfilePatch, Signup};
use quill_shared::dto::{
    AuthResponse, AuthorView, BookmarksResponse, LoginRequest, MessageResponse, Paginated,
    UserView, VerifyEmailRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload::{FormFile, ensure_allowed_image, read_form};

const DEFAULT_AUTHOR_PAGE_SIZE: u64 = 12;

fn request_origin(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parse an optional dob form field: absent means "leave unchanged", an
/// empty value clears the date, anything else must be YYYY-MM-DD.
fn parse_dob(raw: Option<&str>) -> Result<Option<Option<NaiveDate>>, AppError> {
    match raw {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(|d| Some(Some(d)))
            .map_err(|_| AppError::BadRequest("Invalid date of birth.".to_string())),
    }
}

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "avatar").await?;
    let avatar = form.file.take();
    if let Some(file) = &avatar {
        ensure_allowed_image(file)?;
    }

    let input = Signup {
        name: form.text("name").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        phone: form.text("phone").unwrap_or_default().to_string(),
        password: form.text("password").unwrap_or_default().to_string(),
        description: form.text("description").map(str::to_string),
        dob: parse_dob(form.text("dob"))?.flatten(),
        avatar: avatar.map(FormFile::into_upload),
    };

    let origin = state
        .config
        .verification_origin(request_origin(&req).as_deref());
    let session = state.accounts.signup(input, &origin).await?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token: session.token,
        user: UserView::from(&session.user),
    }))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let session = state.accounts.login(&body.email, &body.password).await?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token: session.token,
        user: UserView::from(&session.user),
    }))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.accounts.me(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

/// PUT /api/auth/me
pub async fn update_me(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut form = read_form(payload, "avatar").await?;
    let avatar = form.file.take();
    if let Some(file) = &avatar {
        ensure_allowed_image(file)?;
    }

    let patch = ProfilePatch {
        name: form.text("name").map(str::to_string),
        description: form.text("description").map(str::to_string),
        dob: parse_dob(form.text("dob"))?,
        email: form.text("email").map(str::to_string),
        phone: form.text("phone").map(str::to_string),
        avatar: avatar.map(FormFile::into_upload),
    };

    let origin = state
        .config
        .verification_origin(request_origin(&req).as_deref());
    let user = state
        .accounts
        .update_profile(identity.user_id, patch, &origin)
        .await?;
    Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    state: web::Data<AppState>,
    body: web::Json<VerifyEmailRequest>,
) -> AppResult<HttpResponse> {
    let user = state.accounts.verify_email(&body.token).await?;
    Ok(HttpResponse::Ok().json(UserView::from(&user)))
}

/// POST /api/auth/resend-email-verification
pub async fn resend_verification(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let origin = state
        .config
        .verification_origin(request_origin(&req).as_deref());
    let sent = state
        .accounts
        .resend_verification(identity.user_id, &origin)
        .await?;

    let message = if sent {
        "Verification email sent."
    } else {
        "Email already verified."
    };
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: message.to_string(),
    }))
}

/// GET /api/auth/author/{id}
pub async fn author(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let user = state.accounts.get_author(*id).await?;
    Ok(HttpResponse::Ok().json(AuthorView::from(&user)))
}

#[derive(Debug, Deserialize)]
pub struct AuthorParams {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/auth/authors
pub async fn authors(
    state: web::Data<AppState>,
    query: web::Query<AuthorParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let page = state
        .accounts
        .list_authors(
            params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()),
            params.page.unwrap_or(1),
            params.limit.unwrap_or(DEFAULT_AUTHOR_PAGE_SIZE),
        )
        .await?;

    let items: Vec<AuthorView> = page.items.iter().map(AuthorView::from).collect();
    Ok(HttpResponse::Ok().json(Paginated {
        items,
        page: page.page,
        limit: page.limit,
        total: page.total,
        total_pages: page.total_pages,
    }))
}

/// GET /api/auth/bookmarks
pub async fn bookmarks(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let bookmarks = state.accounts.bookmarks(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(BookmarksResponse { bookmarks }))
}

/// POST /api/auth/bookmarks/{slug}
pub async fn add_bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let bookmarks = state
        .accounts
        .add_bookmark(identity.user_id, &slug)
        .await?;
    Ok(HttpResponse::Ok().json(BookmarksResponse { bookmarks }))
}

/// DELETE /api/auth/bookmarks/{slug}
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    let bookmarks = state
        .accounts
        .remove_bookmark(identity.user_id, &slug)
        .await?;
    Ok(HttpResponse::Ok().json(BookmarksResponse { bookmarks }))
}
