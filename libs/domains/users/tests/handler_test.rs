//! Handler tests for the users domain
//!
//! The router normally sits behind `require_roles`, which places the caller's
//! claims in request extensions. These tests insert the claims directly so
//! the per-route role checks can be exercised without issuing tokens.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::JwtClaims;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct Fixture {
    app: Router,
    admin: User,
    manager: User,
    customer: User,
}

fn fixture() -> Fixture {
    let admin = User::new("admin@example.com", "Admin", &["admin"]);
    let manager = User::new("manager@example.com", "Manager", &["manager"]);
    let customer = User::new("customer@example.com", "Customer", &["customer"]);

    let repository =
        InMemoryUserRepository::with_users([admin.clone(), manager.clone(), customer.clone()]);

    Fixture {
        app: handlers::router(UserService::new(repository)),
        admin,
        manager,
        customer,
    }
}

fn claims_for(user: &User) -> JwtClaims {
    JwtClaims {
        sub: user.id,
        email: user.email.clone(),
        roles: user.roles.clone(),
        email_verified: true,
        exp: i64::MAX,
        iat: 0,
    }
}

fn request(method: &str, uri: &str, caller: Option<&User>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = caller {
        builder = builder.extension(claims_for(user));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_caller_is_unauthorized() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request("GET", "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_users() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request("GET", "/?limit=2", Some(&f.admin), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page: UserPage = json_body(response.into_body()).await;
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
}

#[tokio::test]
async fn test_manager_cannot_list_users() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request("GET", "/", Some(&f.manager), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_manager_gets_user() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "GET",
            &format!("/{}", f.customer.id),
            Some(&f.manager),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: User = json_body(response.into_body()).await;
    assert_eq!(user, f.customer);
}

#[tokio::test]
async fn test_customer_cannot_get_user() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "GET",
            &format!("/{}", f.admin.id),
            Some(&f.customer),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_get_unknown_user_is_404() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "GET",
            &format!("/{}", Uuid::now_v7()),
            Some(&f.admin),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_customer_updates_own_profile() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "PATCH",
            &format!("/{}", f.customer.id),
            Some(&f.customer),
            Some(json!({"name": "Renamed", "phone": "+15551234567"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: User = json_body(response.into_body()).await;
    assert_eq!(user.name, "Renamed");
    assert_eq!(user.phone.as_deref(), Some("+15551234567"));
    assert!(!user.phone_verified);
}

#[tokio::test]
async fn test_customer_cannot_update_someone_else() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "PATCH",
            &format!("/{}", f.manager.id),
            Some(&f.customer),
            Some(json!({"name": "Hijacked"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_updates_any_profile() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "PATCH",
            &format!("/{}", f.customer.id),
            Some(&f.admin),
            Some(json!({"image": "https://cdn.example.com/a.png"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_patch_is_400() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "PATCH",
            &format!("/{}", f.customer.id),
            Some(&f.customer),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "No valid updates provided");
}

#[tokio::test]
async fn test_invalid_phone_is_400() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "PATCH",
            &format!("/{}", f.customer.id),
            Some(&f.customer),
            Some(json!({"phone": "call me"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let f = fixture();
    let uri = format!("/{}", f.customer.id);

    let response = f
        .app
        .clone()
        .oneshot(request("DELETE", &uri, Some(&f.admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = f
        .app
        .oneshot(request("DELETE", &uri, Some(&f.admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manager_cannot_delete_user() {
    let f = fixture();
    let response = f
        .app
        .oneshot(request(
            "DELETE",
            &format!("/{}", f.customer.id),
            Some(&f.manager),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
