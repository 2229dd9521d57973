//! End-to-end HTTP flows through the fully layered router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shelf_app::AppState;
use shelf_authz::TokenService;
use shelf_db::Stores;
use shelf_kernel::settings::{RelationalSettings, StorageBackend, StorageSettings};
use shelf_kernel::Settings;
use tower::ServiceExt;

async fn app_with(stores: Stores) -> Router {
    let settings = Settings::default();
    let state = AppState::new(stores, TokenService::from_settings(&settings.auth));
    let registry = shelf_app::init_modules(&settings, &state).await.unwrap();
    shelf_http::build_router(&registry, &settings)
}

async fn app() -> Router {
    app_with(Stores::in_memory()).await
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Sign up and log in, returning (user id, token).
async fn register(app: &Router, name: &str) -> (u64, String) {
    let email = format!("{name}@x.com");
    let (status, body) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_u64().unwrap();

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (id, body["data"]["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn owner_scenario() {
    let app = app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (_, bob) = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(&alice),
        Some(json!({ "title": "T", "isbn": "I", "writer": "W" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert_eq!(body["data"]["owner_id"], alice_id);
    let uri = format!("/api/books/{}", body["data"]["id"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "title": "stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({ "title": "T2", "owner_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "T2");
    assert_eq!(body["data"]["isbn"], "I");
    assert_eq!(body["data"]["owner_id"], alice_id);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": 200, "data": null }));

    let (status, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutations_require_a_token() {
    let app = app().await;
    let book = json!({ "title": "T", "isbn": "I", "writer": "W" });

    let (status, body) = send(&app, Method::POST, "/api/books", None, Some(book.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/books",
        Some("not-a-token"),
        Some(book),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::DELETE, "/api/users/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::GET, "/api/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn users_are_self_service_only() {
    let app = app().await;
    let (alice_id, alice) = register(&app, "alice").await;
    let (bob_id, bob) = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{alice_id}"),
        Some(&bob),
        Some(json!({ "name": "mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{bob_id}"),
        Some(&bob),
        Some(json!({ "name": "robert" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "robert");

    let (status, _) = send(&app, Method::DELETE, "/api/users/999", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/api/users", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("secret").is_none());
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@x.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn bad_input_is_reported() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({ "email": "not-an-email", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    let fields: Vec<_> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);

    let (status, body) = send(&app, Method::GET, "/api/books/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_lists_module_routes() {
    let app = app().await;
    let (status, doc) = send(&app, Method::GET, "/docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);

    for path in ["/api/auth/login", "/api/users", "/api/books", "/api/books/{id}"] {
        assert!(doc["paths"][path].is_object(), "missing {path}");
    }
    assert!(doc["components"]["schemas"]["Book"].is_object());

    let (status, _) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn relational_backend_serves_the_same_flow() {
    let storage = StorageSettings {
        backend: StorageBackend::Relational,
        relational: RelationalSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        ..StorageSettings::default()
    };
    let app = app_with(shelf_db::connect(&storage).await.unwrap()).await;
    let (alice_id, alice) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(&alice),
        Some(json!({ "title": "T", "isbn": "I", "writer": "W" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["owner_id"], alice_id);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{alice_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &format!("/api/users/{alice_id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{alice_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}
