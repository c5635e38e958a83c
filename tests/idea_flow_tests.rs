//! End-to-end flows around idea CRUD, expansion persistence, ownership
//! scoping, and the password reset path.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ideaforge::config::Config;
use ideaforge::db::Store;
use ideaforge::models::FollowUpPrompt;
use ideaforge::parser::extract_sections;
use ideaforge::services::{AuthService, SeaOrmAuthService, generate_follow_ups};
use std::sync::atomic::{AtomicU32, Ordering};
use tower::ServiceExt;

static DB_COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_database_path() -> String {
    let n = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "ideaforge-flow-test-{}-{}.db",
        std::process::id(),
        n
    ));
    format!("sqlite:{}", path.display())
}

async fn spawn_app() -> Router {
    // Expansion must fail deterministically in these tests, regardless of
    // what the host environment has configured.
    unsafe { std::env::remove_var("GROQ_API_KEY") };

    let mut config = Config::default();
    config.general.database_path = temp_database_path();
    config.server.secure_cookies = false;

    let state = ideaforge::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    ideaforge::api::router(state).await
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

fn request_with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn register(app: &Router, name: &str, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "name": name,
                        "email": email,
                        "password": "Sup3rSecret",
                        "password_confirm": "Sup3rSecret",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn create_idea(app: &Router, cookie: &str, title: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "POST",
            "/api/ideas",
            cookie,
            serde_json::json!({
                "title": title,
                "raw_idea": "A service that pairs mentors with first-time founders.",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "draft");
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_idea_crud_roundtrip() {
    let app = spawn_app().await;
    let cookie = register(&app, "Morgan", "morgan@example.com").await;

    let id = create_idea(&app, &cookie, "Mentor marketplace").await;

    // Read it back
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", &format!("/api/ideas/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Mentor marketplace");
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 0);

    // Update title and tags
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/ideas/{id}"),
            &cookie,
            serde_json::json!({"title": "Mentor network", "tags": ["b2c", "marketplace"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Mentor network");
    assert_eq!(body["data"]["tags"][1], "marketplace");

    // Favorite toggle flips both ways
    for expected in [true, false] {
        let response = app
            .clone()
            .oneshot(request_with_cookie(
                "POST",
                &format!("/api/ideas/{id}/favorite"),
                &cookie,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["data"]["is_favorite"], expected);
    }

    // Stats see one draft
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", "/api/ideas/stats", &cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["drafts"], 1);
    assert_eq!(body["data"]["expanded"], 0);

    // Delete, then the idea is gone
    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "DELETE",
            &format!("/api/ideas/{id}"),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", &format!("/api/ideas/{id}"), &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let app = spawn_app().await;
    let cookie = register(&app, "Quinn", "quinn@example.com").await;

    create_idea(&app, &cookie, "Solar panel subscriptions").await;
    create_idea(&app, &cookie, "Community tool library").await;

    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "GET",
            "/api/ideas?search=solar",
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Solar panel subscriptions");

    // Status filter: everything is a draft right now
    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "GET",
            "/api/ideas?status=expanded",
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    // Unknown status value is rejected
    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "GET",
            "/api/ideas?status=bogus",
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Pagination clamps the limit
    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "GET",
            "/api/ideas?limit=9999",
            &cookie,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["limit"], 50);
}

#[tokio::test]
async fn test_failed_expansion_leaves_idea_untouched() {
    let app = spawn_app().await;
    let cookie = register(&app, "Drew", "drew@example.com").await;

    let id = create_idea(&app, &cookie, "Robot gardeners").await;

    // No API key is configured, so the single completion call fails and
    // surfaces as an external-service error.
    let response = app
        .clone()
        .oneshot(request_with_cookie(
            "POST",
            &format!("/api/ideas/{id}/expand"),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // The idea is exactly as it was: draft, no sections, no content.
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", &format!("/api/ideas/{id}"), &cookie))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "draft");
    assert!(body["data"]["expanded_content"].is_null());
    assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_ideas_are_owner_scoped() {
    let app = spawn_app().await;
    let cookie_a = register(&app, "Owner", "owner@example.com").await;
    let cookie_b = register(&app, "Other", "other@example.com").await;

    let id = create_idea(&app, &cookie_a, "Private idea").await;

    // Another user sees plain not-found, never forbidden
    for (method, uri) in [
        ("GET", format!("/api/ideas/{id}")),
        ("DELETE", format!("/api/ideas/{id}")),
        ("POST", format!("/api/ideas/{id}/favorite")),
        ("POST", format!("/api/ideas/{id}/expand")),
    ] {
        let response = app
            .clone()
            .oneshot(request_with_cookie(method, &uri, &cookie_b))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::NOT_FOUND,
            "{method} {uri} should be hidden from non-owners"
        );
    }

    // The owner still sees it
    let response = app
        .clone()
        .oneshot(request_with_cookie("GET", &format!("/api/ideas/{id}"), &cookie_a))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_archive_is_one_way() {
    let app = spawn_app().await;
    let cookie = register(&app, "Sky", "sky@example.com").await;

    let id = create_idea(&app, &cookie, "Archived someday").await;

    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/ideas/{id}"),
            &cookie,
            serde_json::json!({"status": "archived"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "archived");

    // No path back to draft
    let response = app
        .clone()
        .oneshot(json_request_with_cookie(
            "PUT",
            &format!("/api/ideas/{id}"),
            &cookie,
            serde_json::json!({"status": "draft"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Store-level expansion persistence
// ---------------------------------------------------------------------------

const GENERATED: &str = "## Problem Statement\nGardens are neglected.\n\n\
## Target Users\nBusy homeowners.\n\n\
## Core Features\n- Autonomous weeding\n\n\
## User Workflow\nSchedule, monitor, harvest.\n\n\
## Risks & Challenges\nHardware cost.\n\n\
## Success Metrics\nGardens maintained per week.\n";

const REGENERATED: &str = "## Problem Statement\nRevised problem.\n\n\
## Success Metrics\nRevised metrics.\n";

#[tokio::test]
async fn test_expansion_persistence_and_replacement() {
    let store = Store::new(&temp_database_path()).await.unwrap();

    let admin = store
        .get_user_by_email("admin@ideaforge.local")
        .await
        .unwrap()
        .unwrap();

    let idea = store
        .create_idea(admin.id, "Robot gardeners", "Robots that weed the garden")
        .await
        .unwrap();

    let sections = extract_sections(GENERATED);
    let prompts = generate_follow_ups(&idea.raw_idea, &sections);

    let expanded = store
        .save_idea_expansion(idea.id, admin.id, GENERATED, &sections, &prompts)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(expanded.status, ideaforge::domain::IdeaStatus::Expanded);
    assert_eq!(expanded.sections.len(), 6);
    assert_eq!(expanded.suggested_prompts.len(), 6);
    assert_eq!(
        expanded.sections[0].section_type,
        ideaforge::domain::SectionType::Problem
    );
    assert_eq!(expanded.sections[5].order_index, 5);

    // Re-expansion replaces all rows, no duplicates or orphans
    let sections = extract_sections(REGENERATED);
    let prompts: Vec<FollowUpPrompt> = generate_follow_ups(&idea.raw_idea, &sections);
    assert_eq!(prompts.len(), 3, "only the unconditional templates remain");

    let re_expanded = store
        .save_idea_expansion(idea.id, admin.id, REGENERATED, &sections, &prompts)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(re_expanded.sections.len(), 2);
    assert_eq!(re_expanded.sections[0].content, "Revised problem.");
    assert_eq!(re_expanded.sections[1].content, "Revised metrics.");
}

#[tokio::test]
async fn test_headerless_expansion_still_succeeds() {
    let store = Store::new(&temp_database_path()).await.unwrap();

    let admin = store
        .get_user_by_email("admin@ideaforge.local")
        .await
        .unwrap()
        .unwrap();

    let idea = store
        .create_idea(admin.id, "Freeform output", "An idea the model rambles about")
        .await
        .unwrap();

    let generated = "The model wrote prose without any headers at all.";
    let sections = extract_sections(generated);
    assert!(sections.is_empty());

    let prompts = generate_follow_ups(&idea.raw_idea, &sections);
    let expanded = store
        .save_idea_expansion(idea.id, admin.id, generated, &sections, &prompts)
        .await
        .unwrap()
        .unwrap();

    // Still flips to expanded, with zero persisted section rows.
    assert_eq!(expanded.status, ideaforge::domain::IdeaStatus::Expanded);
    assert!(expanded.sections.is_empty());
    assert_eq!(expanded.expanded_content.as_deref(), Some(generated));
}

#[tokio::test]
async fn test_user_delete_cascades_to_ideas_and_sections() {
    let store = Store::new(&temp_database_path()).await.unwrap();

    let security = ideaforge::config::SecurityConfig::default();
    let victim = store
        .create_user(
            "victim@example.com",
            "Victim",
            "Sup3rSecret",
            ideaforge::domain::Role::User,
            Some(&security),
        )
        .await
        .unwrap();
    let bystander = store
        .create_user(
            "bystander@example.com",
            "Bystander",
            "Sup3rSecret",
            ideaforge::domain::Role::User,
            Some(&security),
        )
        .await
        .unwrap();

    let doomed = store
        .create_idea(victim.id, "Doomed idea", "This idea will go away")
        .await
        .unwrap();
    let kept = store
        .create_idea(bystander.id, "Kept idea", "This idea survives")
        .await
        .unwrap();

    let sections = extract_sections(GENERATED);
    let prompts = generate_follow_ups("x", &sections);
    store
        .save_idea_expansion(doomed.id, victim.id, GENERATED, &sections, &prompts)
        .await
        .unwrap()
        .unwrap();

    assert!(store.delete_user(victim.id).await.unwrap());

    assert!(store.get_idea_any(doomed.id).await.unwrap().is_none());
    let surviving = store.get_idea_any(kept.id).await.unwrap().unwrap();
    assert_eq!(surviving.title, "Kept idea");
}

// ---------------------------------------------------------------------------
// Password reset flow (service level, where the raw token is visible)
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_password_reset_flow() {
    let store = Store::new(&temp_database_path()).await.unwrap();
    let security = ideaforge::config::SecurityConfig::default();
    let auth = SeaOrmAuthService::new(store.clone(), security);

    auth.register("Remy", "remy@example.com", "Sup3rSecret")
        .await
        .unwrap();

    // Unknown email issues nothing but does not error
    assert!(auth.forgot_password("ghost@example.com").await.unwrap().is_none());

    let issued = auth
        .forgot_password("remy@example.com")
        .await
        .unwrap()
        .expect("token should be issued");

    auth.reset_password(&issued.token, "Bran0NewSecret")
        .await
        .unwrap();

    // New password works, old one does not
    assert!(auth.login("remy@example.com", "Bran0NewSecret").await.is_ok());
    assert!(auth.login("remy@example.com", "Sup3rSecret").await.is_err());

    // The token was consumed and cannot be replayed
    let replay = auth.reset_password(&issued.token, "Y3tAnotherOne").await;
    assert!(replay.is_err());

    // Garbage tokens are rejected outright
    assert!(auth.reset_password("deadbeef", "Y3tAnotherOne").await.is_err());
}
