//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Account routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me))
                    .route("/me", web::put().to(auth::update_me))
                    .route("/verify-email", web::post().to(auth::verify_email))
                    .route(
                        "/resend-email-verification",
                        web::post().to(auth::resend_verification),
                    )
                    .route("/authors", web::get().to(auth::authors))
                    .route("/author/{id}", web::get().to(auth::author))
                    .route("/bookmarks", web::get().to(auth::bookmarks))
                    .route("/bookmarks/{slug}", web::post().to(auth::add_bookmark))
                    .route("/bookmarks/{slug}", web::delete().to(auth::remove_bookmark)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{slug}", web::get().to(posts::get))
                    .route("/{slug}", web::put().to(posts::update))
                    .route("/{slug}", web::delete().to(posts::delete))
                    .route("/{slug}/comments", web::get().to(posts::comments))
                    .route("/{slug}/comments", web::post().to(posts::add_comment))
                    .route(
                        "/{slug}/comments/{comment_id}",
                        web::delete().to(posts::delete_comment),
                    )
                    .route("/{slug}/likes", web::post().to(posts::like))
                    .route("/{slug}/likes", web::delete().to(posts::unlike)),
            ),
    );
}
