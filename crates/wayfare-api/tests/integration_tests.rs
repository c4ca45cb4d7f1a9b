//! # Integration Tests for wayfare-api
//!
//! Drives the assembled router with `tower::ServiceExt::oneshot`: health
//! probes, authentication and authorization behavior, request
//! validation, 503-without-database behavior for data routes, the
//! payment webhook's shared-secret gate, the connect flow's provider
//! exchange (against wiremock), and OpenAPI generation.
//!
//! Nothing here needs Postgres or S3 — data routes are exercised up to
//! their dependency boundary, where they answer 503.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use wayfare_api::auth::{issue_session_token, SecretString, SessionIdentity};
use wayfare_api::config::{AppConfig, ConnectConfig};
use wayfare_api::state::AppState;
use wayfare_core::{AccountId, AccountKind};

/// Helper: build the test app with no database and no storage.
fn test_app() -> axum::Router {
    wayfare_api::app(AppState::new())
}

/// Helper: build the test app from explicit config.
fn test_app_with_config(config: AppConfig) -> axum::Router {
    wayfare_api::app(AppState::with_config(config, None, None))
}

/// Helper: a signed session token for the test secret.
fn token_for(kind: AccountKind) -> String {
    let identity = SessionIdentity {
        account_id: AccountId::new(),
        kind,
        needs_type_selection: false,
    };
    issue_session_token(identity, &SecretString::new("test-secret"), 1).unwrap()
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&json).unwrap()))
        .unwrap()
}

fn post_json_with_token(uri: &str, json: serde_json::Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_string(&json).unwrap()))
        .unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_without_database() {
    // No database configured at all is a ready deployment; data routes
    // individually answer 503.
    let app = test_app();
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_app();
    let response = app.oneshot(get("/v1/purchases")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_string(response).await;
    assert!(body.contains("UNAUTHORIZED"), "body: {body}");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = test_app();
    let response = app
        .oneshot(get_with_token("/v1/purchases", "not-a-jwt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_secret_token_is_rejected() {
    let identity = SessionIdentity {
        account_id: AccountId::new(),
        kind: AccountKind::User,
        needs_type_selection: false,
    };
    let forged = issue_session_token(identity, &SecretString::new("other-secret"), 1).unwrap();
    let app = test_app();
    let response = app
        .oneshot(get_with_token("/v1/purchases", &forged))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_mid_onboarding_session_is_denied() {
    let identity = SessionIdentity {
        account_id: AccountId::new(),
        kind: AccountKind::User,
        needs_type_selection: true,
    };
    let token = issue_session_token(identity, &SecretString::new("test-secret"), 1).unwrap();
    let app = test_app();
    let response = app
        .oneshot(get_with_token("/v1/purchases", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Authorization (account kind) ---------------------------------------------

#[tokio::test]
async fn test_creator_route_rejects_user_accounts() {
    let app = test_app();
    let token = token_for(AccountKind::User);
    let response = app
        .oneshot(post_json_with_token(
            "/v1/discounts",
            serde_json::json!({"code": "SUMMER10", "percent_off": 10}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_string(response).await;
    assert!(body.contains("creator account"), "body: {body}");
}

#[tokio::test]
async fn test_user_route_rejects_creator_accounts() {
    let app = test_app();
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(post_json_with_token(
            "/v1/purchases",
            serde_json::json!({"content_id": "00000000-0000-0000-0000-000000000000", "content_type": "trip"}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// -- Validation ---------------------------------------------------------------

#[tokio::test]
async fn test_signin_missing_password_is_400() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/auth/signin",
            serde_json::json!({"email": "jo@example.com", "password": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("password is required"), "body: {body}");
}

#[tokio::test]
async fn test_signup_short_password_is_400() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/auth/signup",
            serde_json::json!({
                "kind": "user",
                "name": "Jo",
                "email": "jo@example.com",
                "username": "jo",
                "password": "short"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_body_is_400() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/signin")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_access_missing_key_is_400() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/access/verify",
            serde_json::json!({
                "email": "jo@example.com",
                "access_key": "",
                "package_id": "00000000-0000-0000-0000-000000000000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("access_key is required"), "body: {body}");
}

#[tokio::test]
async fn test_create_trip_bad_status_validation_runs_before_database() {
    // Validation rejects before the handler reaches the (absent)
    // database, so this is 400 rather than 503.
    let app = test_app();
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(post_json_with_token(
            "/v1/trips",
            serde_json::json!({
                "creator_id": "00000000-0000-0000-0000-000000000000",
                "title": ""
            }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("title is required"), "body: {body}");
}

// -- Data routes without a database -------------------------------------------

#[tokio::test]
async fn test_list_trips_returns_503_without_database() {
    let app = test_app();
    let response = app.oneshot(get("/v1/trips")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_string(response).await;
    assert!(body.contains("SERVICE_UNAVAILABLE"), "body: {body}");
}

#[tokio::test]
async fn test_list_gotos_returns_503_without_database() {
    let app = test_app();
    let response = app.oneshot(get("/v1/gotos")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_verify_access_returns_503_without_database() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/access/verify",
            serde_json::json!({
                "email": "jo@example.com",
                "access_key": "ab".repeat(32),
                "package_id": "00000000-0000-0000-0000-000000000000"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_signup_returns_503_without_database() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/auth/signup",
            serde_json::json!({
                "kind": "creator",
                "name": "Ada",
                "email": "ada@example.com",
                "username": "ada",
                "password": "longenough"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Media --------------------------------------------------------------------

#[tokio::test]
async fn test_media_proxy_returns_503_without_storage() {
    let app = test_app();
    let response = app.oneshot(get("/v1/media/abc123.jpg")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_media_upload_requires_creator_session() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/media")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// -- Payment webhook ----------------------------------------------------------

#[tokio::test]
async fn test_webhook_returns_503_when_not_configured() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/v1/webhooks/payment",
            serde_json::json!({
                "purchase_id": "00000000-0000-0000-0000-000000000000",
                "outcome": "completed"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_webhook_rejects_wrong_secret() {
    let mut config = AppConfig::for_tests();
    config.webhook_secret = Some(SecretString::new("hook-secret"));
    let app = test_app_with_config(config);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/webhooks/payment")
        .header("content-type", "application/json")
        .header("x-webhook-secret", "wrong")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({
                "purchase_id": "00000000-0000-0000-0000-000000000000",
                "outcome": "completed"
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_unknown_outcome() {
    let mut config = AppConfig::for_tests();
    config.webhook_secret = Some(SecretString::new("hook-secret"));
    let app = test_app_with_config(config);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/webhooks/payment")
        .header("content-type", "application/json")
        .header("x-webhook-secret", "hook-secret")
        .body(Body::from(
            serde_json::to_string(&serde_json::json!({
                "purchase_id": "00000000-0000-0000-0000-000000000000",
                "outcome": "maybe"
            }))
            .unwrap(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- Connect flow -------------------------------------------------------------

fn config_with_connect(token_url: String) -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.connect = Some(ConnectConfig {
        client_id: "ca_test_123".to_string(),
        client_secret: SecretString::new("sk_test_secret"),
        authorize_url: "https://connect.example.com/oauth/authorize".to_string(),
        token_url,
        redirect_uri: "https://wayfare.example.com/v1/connect/callback".to_string(),
    });
    config
}

#[tokio::test]
async fn test_connect_authorize_returns_503_when_not_configured() {
    let app = test_app();
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(get_with_token("/v1/connect/authorize", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_connect_authorize_url_carries_client_id_and_redirect() {
    let app = test_app_with_config(config_with_connect(
        "https://connect.example.com/oauth/token".to_string(),
    ));
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(get_with_token("/v1/connect/authorize", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("ca_test_123"), "body: {body}");
    assert!(body.contains("redirect_uri="), "body: {body}");
    assert!(body.contains("response_type=code"), "body: {body}");
}

#[tokio::test]
async fn test_connect_authorize_rejects_user_accounts() {
    let app = test_app_with_config(config_with_connect(
        "https://connect.example.com/oauth/token".to_string(),
    ));
    let token = token_for(AccountKind::User);
    let response = app
        .oneshot(get_with_token("/v1/connect/authorize", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_connect_callback_maps_provider_rejection_to_400() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app_with_config(config_with_connect(format!("{}/oauth/token", server.uri())));
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(get_with_token(
            "/v1/connect/callback?code=ac_bad_code",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("rejected"), "body: {body}");
}

#[tokio::test]
async fn test_connect_callback_without_code_is_400() {
    let app = test_app_with_config(config_with_connect(
        "https://connect.example.com/oauth/token".to_string(),
    ));
    let token = token_for(AccountKind::Creator);
    let response = app
        .oneshot(get_with_token("/v1/connect/callback", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("code is required"), "body: {body}");
}

// -- Routing ------------------------------------------------------------------

#[tokio::test]
async fn test_method_not_allowed_is_405() {
    let app = test_app();
    let request = Request::builder()
        .method("PATCH")
        .uri("/v1/trips")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();
    let response = app.oneshot(get("/v1/does-not-exist")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_generates() {
    let app = test_app();
    let response = app.oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let spec: serde_json::Value = serde_json::from_str(&body).unwrap();
    let paths = spec["paths"].as_object().unwrap();
    assert!(paths.contains_key("/v1/trips"));
    assert!(paths.contains_key("/v1/gotos"));
    assert!(paths.contains_key("/v1/access/verify"));
    assert!(paths.contains_key("/v1/access/grants"));
    assert!(paths.contains_key("/v1/webhooks/payment"));
    assert!(paths.contains_key("/v1/connect/authorize"));
}
