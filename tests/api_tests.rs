use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ideaforge::config::Config;
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

/// Bootstrap admin seeded by the initial migration
const ADMIN_EMAIL: &str = "admin@ideaforge.local";
const ADMIN_PASSWORD: &str = "ChangeMe123";

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_database_path() -> String {
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "ideaforge-api-test-{}-{}.db",
        std::process::id(),
        n
    ));
    format!("sqlite:{}", path.display())
}

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = temp_database_path();
    config.server.secure_cookies = false;

    let state = ideaforge::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    ideaforge::api::router(state).await
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request_with_cookie(
    method: &str,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .header(header::COOKIE, cookie)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn session_cookie(response: &axum::http::Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
    session_cookie(&response)
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "password_confirm": password,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(
        response.status(),
        StatusCode::OK,
        "registration failed for {email}"
    );
    session_cookie(&response)
}

#[tokio::test]
async fn test_auth_required() {
    let app = spawn_app().await;

    for uri in ["/api/ideas", "/api/auth/me", "/api/system/status"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = spawn_app().await;

    let cookie = register(&app, "Jordan", "jordan@example.com", "Sup3rSecret").await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "jordan@example.com");
    assert_eq!(body["data"]["role"], "user");

    // Fresh login with the same credentials
    let cookie = login(&app, "jordan@example.com", "Sup3rSecret").await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password is rejected with the same message as unknown email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({"email": "jordan@example.com", "password": "WrongPass1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation() {
    let app = spawn_app().await;

    // Weak password
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "name": "Sam",
                "email": "sam@example.com",
                "password": "alllowercase",
                "password_confirm": "alllowercase",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bad email
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "name": "Sam",
                "email": "not-an-email",
                "password": "Sup3rSecret",
                "password_confirm": "Sup3rSecret",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Mismatched confirmation
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "name": "Sam",
                "email": "sam@example.com",
                "password": "Sup3rSecret",
                "password_confirm": "Different1",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let app = spawn_app().await;

    register(&app, "First", "dup@example.com", "Sup3rSecret").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({
                "name": "Second",
                "email": "DUP@example.com",
                "password": "Sup3rSecret",
                "password_confirm": "Sup3rSecret",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_routes_are_role_gated() {
    let app = spawn_app().await;

    // Regular account gets 403
    let cookie = register(&app, "Pat", "pat@example.com", "Sup3rSecret").await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/admin/dashboard", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Seeded admin gets through
    let admin_cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/admin/dashboard", &admin_cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"]["total_users"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = spawn_app().await;

    let cookie = register(&app, "Alex", "alex@example.com", "Sup3rSecret").await;

    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            "/api/auth/profile",
            &cookie,
            serde_json::json!({"name": "Alexandra", "email": "alex@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["name"], "Alexandra");

    // Wrong current password
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            "/api/auth/password",
            &cookie,
            serde_json::json!({
                "current_password": "Nope12345",
                "new_password": "An0therSecret",
                "new_password_confirm": "An0therSecret",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Correct current password
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            "/api/auth/password",
            &cookie,
            serde_json::json!({
                "current_password": "Sup3rSecret",
                "new_password": "An0therSecret",
                "new_password_confirm": "An0therSecret",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // New password works
    login(&app, "alex@example.com", "An0therSecret").await;
}

#[tokio::test]
async fn test_admin_cannot_remove_self() {
    let app = spawn_app().await;

    let admin_cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &admin_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    let admin_id = body["data"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/admin/users/{admin_id}"))
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/users/{admin_id}/toggle"))
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivated_account_cannot_login() {
    let app = spawn_app().await;

    register(&app, "Riley", "riley@example.com", "Sup3rSecret").await;
    let admin_cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Find riley's id in the admin user list
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/admin/users", &admin_cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    let riley = body["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "riley@example.com")
        .expect("riley should be listed");
    let riley_id = riley["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/admin/users/{riley_id}/toggle"))
                .header(header::COOKIE, &admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            serde_json::json!({"email": "riley@example.com", "password": "Sup3rSecret"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = spawn_app().await;

    let cookie = register(&app, "Casey", "casey@example.com", "Sup3rSecret").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/auth/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
