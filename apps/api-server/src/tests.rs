//! Transport-level tests: routes, auth extraction, multipart upload and the
//! wire shapes, running against the in-memory state.

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::Value;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

const BOUNDARY: &str = "----quill-test-boundary";

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: None,
        client_origin: None,
        public_app_url: None,
        upload_dir: "./uploads".to_string(),
    }
}

fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($state.token_service.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

macro_rules! signup {
    ($app:expr, $email:expr, $phone:expr) => {{
        let (ct, body) = multipart_body(
            &[
                ("name", "Ada"),
                ("email", $email),
                ("phone", $phone),
                ("password", "correct horse"),
            ],
            Some(("avatar", "a.png", "image/png", &[0xff, 0xd8, 0xff])),
        );
        let req = test::TestRequest::post()
            .uri("/api/auth/signup")
            .insert_header((header::CONTENT_TYPE, ct))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        let token = json["token"].as_str().unwrap().to_string();
        (token, json["user"].clone())
    }};
}

#[actix_web::test]
async fn health_reports_ok() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["status"], "ok");
}

#[actix_web::test]
async fn protected_routes_require_a_bearer_token() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/posts/some-slug/likes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn signup_login_and_me_round_trip() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let (token, user) = signup!(app, "ada@example.com", "555-0100");
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["isEmailVerified"], false);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "correct horse"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "wrong"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["name"], "Ada");
    assert_eq!(json["bookmarks"], serde_json::json!([]));
}

#[actix_web::test]
async fn signup_rejects_non_image_avatars() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let (ct, body) = multipart_body(
        &[
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("phone", "555-0100"),
            ("password", "correct horse"),
        ],
        Some(("avatar", "a.txt", "text/plain", b"hello")),
    );
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .insert_header((header::CONTENT_TYPE, ct))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn post_lifecycle_over_http() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let (token, _) = signup!(app, "author@example.com", "555-0001");
    let (other_token, _) = signup!(app, "other@example.com", "555-0002");
    let auth = format!("Bearer {token}");
    let other_auth = format!("Bearer {other_token}");

    // Unauthenticated create is rejected.
    let (ct, body) = multipart_body(&[("title", "Hi"), ("slug", "hi"), ("content", "x")], None);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::CONTENT_TYPE, ct))
        .set_payload(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // Create.
    let (ct, body) = multipart_body(
        &[
            ("title", "Hi"),
            ("slug", "Hi"),
            ("content", "x"),
            ("tags", "rust, web"),
        ],
        None,
    );
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::CONTENT_TYPE, ct))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = test::read_body_json(resp).await;
    assert_eq!(json["slug"], "hi", "slug lowercased");
    assert_eq!(json["id"], "hi", "slug doubles as public id");
    assert_eq!(json["tags"], serde_json::json!(["rust", "web"]));

    // Duplicate slug conflicts.
    let (ct, body) = multipart_body(&[("title", "Hi2"), ("slug", "HI"), ("content", "y")], None);
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::CONTENT_TYPE, ct))
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .set_payload(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    // Each fetch increments views.
    let req = test::TestRequest::get().uri("/api/posts/hi").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["views"], 1);
    let req = test::TestRequest::get().uri("/api/posts/hi").to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["views"], 2);

    // Likes are idempotent per user.
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/posts/hi/likes")
            .insert_header((header::AUTHORIZATION, other_auth.clone()))
            .to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json["likesCount"], 1);
        assert_eq!(json["likedByMe"], true);
    }
    let req = test::TestRequest::delete()
        .uri("/api/posts/hi/likes")
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["likesCount"], 0);
    assert_eq!(json["likedByMe"], false);

    // Only the owner may update.
    let (ct, body) = multipart_body(&[("title", "Stolen")], None);
    let req = test::TestRequest::put()
        .uri("/api/posts/hi")
        .insert_header((header::CONTENT_TYPE, ct))
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .set_payload(body)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // Comments attach to the post.
    let req = test::TestRequest::post()
        .uri("/api/posts/hi/comments")
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .set_json(serde_json::json!({ "content": "nice" }))
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["content"], "nice");
    assert_eq!(json["author"]["name"], "Ada");

    let req = test::TestRequest::get()
        .uri("/api/posts/hi/comments")
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    // Bookmark the post, then delete it: the bookmark dangles.
    let req = test::TestRequest::post()
        .uri("/api/auth/bookmarks/hi")
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["bookmarks"], serde_json::json!(["hi"]));

    let req = test::TestRequest::delete()
        .uri("/api/posts/hi")
        .insert_header((header::AUTHORIZATION, auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Post and its comments are gone.
    let req = test::TestRequest::get().uri("/api/posts/hi").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
    let req = test::TestRequest::get()
        .uri("/api/posts/hi/comments")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    // The dangling bookmark is still listed.
    let req = test::TestRequest::get()
        .uri("/api/auth/bookmarks")
        .insert_header((header::AUTHORIZATION, other_auth.clone()))
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["bookmarks"], serde_json::json!(["hi"]));
}

#[actix_web::test]
async fn listing_carries_pagination_metadata() {
    let state = AppState::in_memory(test_config());
    let app = test_app!(state);

    let (token, _) = signup!(app, "author@example.com", "555-0001");
    let auth = format!("Bearer {token}");

    for i in 0..3 {
        let slug = format!("post-{i}");
        let (ct, body) = multipart_body(
            &[("title", "T"), ("slug", slug.as_str()), ("content", "c")],
            None,
        );
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::CONTENT_TYPE, ct))
            .insert_header((header::AUTHORIZATION, auth.clone()))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/posts?page=2&limit=2")
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["total"], 3);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["page"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/posts?q=nothing-matches-this")
        .to_request();
    let json: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["totalPages"], 1);
}
