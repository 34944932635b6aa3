//! Router tests that never reach the database
//!
//! Authentication, request validation and the self-delete rule are all
//! decided before the first query, so these run against a pool that cannot
//! connect.

mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use common::{body_json, json_request, lazy_app, multipart_request, token_for, FilePart, JWT_SECRET};
use backoffice_shared::auth::jwt::issue_token_pair;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let response = lazy_app()
        .oneshot(json_request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    for (method, uri) in [
        (Method::GET, "/v1/users"),
        (Method::GET, "/v1/auth/me"),
        (Method::GET, "/v1/store"),
        (Method::DELETE, "/v1/store/gst-numbers/0"),
    ] {
        let response = lazy_app()
            .oneshot(json_request(method, uri, None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let pair = issue_token_pair(Uuid::new_v4(), JWT_SECRET).unwrap();

    let response = lazy_app()
        .oneshot(json_request(Method::GET, "/v1/users", Some(&pair.refresh_token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_is_rejected() {
    let request = Request::builder()
        .uri("/v1/users")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = lazy_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_endpoint_issues_access_token() {
    let pair = issue_token_pair(Uuid::new_v4(), JWT_SECRET).unwrap();

    let response = lazy_app()
        .oneshot(json_request(
            Method::POST,
            "/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": pair.refresh_token })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_login_validates_before_lookup() {
    let response = lazy_app()
        .oneshot(json_request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[tokio::test]
async fn test_bulk_delete_including_self_is_forbidden() {
    let caller = Uuid::new_v4();
    let token = token_for(caller);

    let response = lazy_app()
        .oneshot(json_request(
            Method::DELETE,
            "/v1/users/bulk-delete",
            Some(&token),
            Some(json!({ "ids": [Uuid::new_v4(), caller, Uuid::new_v4()] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "You cannot delete your own account");
}

#[tokio::test]
async fn test_delete_self_is_forbidden() {
    let caller = Uuid::new_v4();
    let token = token_for(caller);

    let response = lazy_app()
        .oneshot(json_request(
            Method::DELETE,
            &format!("/v1/users/{}", caller),
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_delete_requires_ids() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(
            Method::DELETE,
            "/v1/users/bulk-delete",
            Some(&token),
            Some(json!({ "ids": [] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "ids");
    assert_eq!(body["details"][0]["message"], "Select at least one user");
}

#[tokio::test]
async fn test_unsortable_column_is_rejected() {
    let token = token_for(Uuid::new_v4());
    // sort=[{"id":"password_hash","desc":true}]
    let uri = "/v1/users?page=1&pageSize=10&sort=%5B%7B%22id%22%3A%22password_hash%22%2C%22desc%22%3Atrue%7D%5D";

    let response = lazy_app()
        .oneshot(json_request(Method::GET, uri, Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "sort");
}

#[tokio::test]
async fn test_malformed_sort_is_rejected() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(Method::GET, "/v1/users?sort=email", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_status_is_rejected() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(
            Method::PUT,
            &format!("/v1/users/{}/status", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "status": "archived" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "status");
}

#[tokio::test]
async fn test_create_user_reports_field_errors() {
    let token = token_for(Uuid::new_v4());

    let request = multipart_request(
        "/v1/users",
        &token,
        &[
            ("username", "jdoe"),
            ("email", "not-an-email"),
            ("password", "secret123"),
            ("confirm_password", "different"),
            ("gender", "other"),
        ],
        None,
    );

    let response = lazy_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    for expected in ["confirm_password", "email", "first_name", "gender", "last_name", "user_code"] {
        assert!(fields.contains(&expected), "missing error for {}", expected);
    }
    assert!(!fields.contains(&"username"));
}

#[tokio::test]
async fn test_avatar_upload_requires_file() {
    let token = token_for(Uuid::new_v4());

    let request = multipart_request(
        &format!("/v1/users/{}/avatar", Uuid::new_v4()),
        &token,
        &[("note", "no file here")],
        None,
    );

    let response = lazy_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "avatar");
}

#[tokio::test]
async fn test_store_image_rejects_non_images() {
    let token = token_for(Uuid::new_v4());

    let request = multipart_request(
        "/v1/store/image",
        &token,
        &[],
        Some(FilePart {
            field: "image",
            file_name: "notes.txt",
            content_type: "text/plain",
            bytes: b"hello",
        }),
    );

    let response = lazy_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "image");
}

#[tokio::test]
async fn test_gst_batch_errors_are_positioned() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(
            Method::POST,
            "/v1/store/gst-numbers",
            Some(&token),
            Some(json!([
                { "name": "GSTIN", "number": "22AAAAA0000A1Z5" },
                { "name": "", "number": "X" }
            ])),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "gstsNumbers[1].name");
}

#[tokio::test]
async fn test_empty_gst_batch_is_rejected() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(
            Method::POST,
            "/v1/store/gst-numbers",
            Some(&token),
            Some(json!([])),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_social_link_requires_valid_url() {
    let token = token_for(Uuid::new_v4());

    let response = lazy_app()
        .oneshot(json_request(
            Method::POST,
            "/v1/store/social-media",
            Some(&token),
            Some(json!({ "platform": "x", "url": "not a url" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "url");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = lazy_app()
        .oneshot(json_request(Method::GET, "/v2/users", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
