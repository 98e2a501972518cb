//! End-to-end interception tests against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use till_auth::refresh::HttpRefresher;
use till_auth::{
    ApiClient, ApiError, ApiRequest, AuthError, LoginRequest, MemorySessionStore, SessionManager,
    SessionStore,
};
use till_config::ApiConfig;
use till_core::enums::SessionState;
use till_core::envelope::{ErrorEnvelope, ErrorMessage, GENERIC_ERROR_MESSAGE};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    client: ApiClient,
    store: Arc<MemorySessionStore>,
}

async fn harness_with(timeout_secs: u64) -> Harness {
    let server = MockServer::start().await;
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs,
        ..ApiConfig::default()
    };
    let store = Arc::new(MemorySessionStore::new());
    let refresher = HttpRefresher::new(&config).expect("refresher");
    let session = SessionManager::builder(store.clone(), Arc::new(refresher)).build();
    let client = ApiClient::new(&config, session).expect("client");
    Harness {
        server,
        client,
        store,
    }
}

async fn harness() -> Harness {
    harness_with(60).await
}

async fn mount_products(server: &MockServer, token: &str, status: u16) {
    let template = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!([{"id": "prd_1"}]))
    } else {
        ResponseTemplate::new(status).set_body_json(json!({
            "statusCode": status,
            "message": "Unauthorized"
        }))
    };
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", token))
        .respond_with(template)
        .mount(server)
        .await;
}

fn refresh_ok(delay: Duration) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"accessToken": "A2", "refreshToken": "R2"}))
        .set_delay(delay)
}

// ---------------------------------------------------------------------------
// Token attachment
// ---------------------------------------------------------------------------

#[tokio::test]
async fn attaches_current_access_token() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    mount_products(&h.server, "A1", 200).await;

    let products: serde_json::Value = h.client.get("/products").await.unwrap();
    assert_eq!(products[0]["id"], "prd_1");
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&h.server)
        .await;

    h.client
        .send(ApiRequest::get("/health").anonymous())
        .await
        .unwrap();

    let received = h.server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

// ---------------------------------------------------------------------------
// 401 recovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_token_is_refreshed_and_request_resent_once() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    mount_products(&h.server, "A1", 401).await;
    mount_products(&h.server, "A2", 200).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(header("cookie", "refreshToken=R1"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(1)
        .mount(&h.server)
        .await;

    let products: serde_json::Value = h.client.get("/products").await.unwrap();
    assert_eq!(products[0]["id"], "prd_1");

    let credentials = h.store.load().unwrap();
    assert_eq!(credentials.access.unwrap().value, "A2");
    assert_eq!(credentials.refresh.unwrap().value, "R2");
    assert_eq!(h.client.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn resent_write_carries_the_same_body() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    let body = json!({"sku": "TEA-01", "name": "Green tea", "price": 450});
    for (token, status) in [("A1", 401), ("A2", 201)] {
        Mock::given(method("POST"))
            .and(path("/products"))
            .and(header("authorization", token))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": "prd_9"})))
            .expect(1)
            .mount(&h.server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(1)
        .mount(&h.server)
        .await;

    let created: serde_json::Value = h.client.post("/products", &body).await.unwrap();
    assert_eq!(created["id"], "prd_9");
}

#[tokio::test]
async fn resent_patch_and_delete_keep_method_and_body() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    let patch = json!({"price": 500});
    for (token, status) in [("A1", 401), ("A2", 200)] {
        Mock::given(method("PATCH"))
            .and(path("/products/prd_9"))
            .and(header("authorization", token))
            .and(body_json(&patch))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"price": 500})))
            .expect(1)
            .mount(&h.server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/products/prd_9"))
        .and(header("authorization", "A2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(1)
        .mount(&h.server)
        .await;

    let updated: serde_json::Value = h.client.patch("/products/prd_9", &patch).await.unwrap();
    assert_eq!(updated["price"], 500);
    h.client.delete("/products/prd_9").await.unwrap();
}

#[tokio::test]
async fn second_401_is_returned_without_another_refresh() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    mount_products(&h.server, "A1", 401).await;
    mount_products(&h.server, "A2", 401).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .send(ApiRequest::get("/products"))
        .await
        .unwrap_err();
    let envelope = err.envelope().expect("server envelope");
    assert_eq!(envelope.status_code, 401);
    assert_eq!(envelope.message, "Unauthorized");

    let products_calls = h
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/products")
        .count();
    assert_eq!(products_calls, 2);
}

#[tokio::test]
async fn failed_refresh_logs_out() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    mount_products(&h.server, "A1", 401).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .send(ApiRequest::get("/products"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Session(AuthError::RefreshFailed(_))));
    assert!(h.store.load().unwrap().is_empty());
    assert!(h.client.session().access_token().is_none());
    assert_eq!(h.client.session().state(), SessionState::Anonymous);
}

#[tokio::test]
async fn missing_refresh_token_logs_out_without_network_refresh() {
    let h = harness().await;
    h.client.session().set_tokens("A1", None).unwrap();
    mount_products(&h.server, "A1", 401).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .send(ApiRequest::get("/products"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Session(AuthError::MissingRefreshToken)));
    assert!(h.client.session().access_token().is_none());
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    mount_products(&h.server, "A1", 401).await;
    mount_products(&h.server, "A2", 200).await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(header("cookie", "refreshToken=R1"))
        .respond_with(refresh_ok(Duration::from_millis(200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let calls = (0..5).map(|_| h.client.send(ApiRequest::get("/products")));
    let outcomes = futures::future::join_all(calls).await;

    for outcome in outcomes {
        assert_eq!(outcome.unwrap().status, 200);
    }
    assert_eq!(h.client.session().access_token().as_deref(), Some("A2"));
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_json_error_body_becomes_generic_envelope() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    Mock::given(method("GET"))
        .and(path("/reports"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .send(ApiRequest::get("/reports"))
        .await
        .unwrap_err();
    let envelope = err.envelope().expect("server envelope");
    assert_eq!(envelope, &ErrorEnvelope::generic());
    assert_eq!(envelope.message, GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn structured_error_body_is_preserved() {
    let h = harness().await;
    h.client.session().set_tokens("A1", Some("R1")).unwrap();
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "statusCode": 422,
            "message": "Validation Error",
            "errorMessages": [{"path": "sku", "message": "sku already exists"}]
        })))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .post::<_, serde_json::Value>("/products", &json!({"sku": "TEA"}))
        .await
        .unwrap_err();
    let envelope = err.envelope().expect("server envelope");
    assert_eq!(envelope.status_code, 422);
    assert_eq!(envelope.message, "Validation Error");
    assert_eq!(
        envelope.error_messages,
        vec![ErrorMessage {
            path: "sku".into(),
            message: "sku already exists".into(),
        }]
    );
}

#[tokio::test]
async fn slow_response_times_out() {
    let h = harness_with(1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&h.server)
        .await;

    let err = h
        .client
        .send(ApiRequest::get("/slow").anonymous())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout));
}

#[tokio::test]
async fn unreachable_backend_becomes_generic_envelope() {
    let config = ApiConfig {
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionManager::builder(
        store,
        Arc::new(HttpRefresher::new(&config).expect("refresher")),
    )
    .build();
    let client = ApiClient::new(&config, session).expect("client");

    let err = client
        .send(ApiRequest::get("/products").anonymous())
        .await
        .unwrap_err();
    assert_eq!(err.envelope(), Some(&ErrorEnvelope::generic()));
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_stores_issued_tokens() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"accessToken": "A1", "refreshToken": "R1"}
        })))
        .mount(&h.server)
        .await;

    h.client
        .login(&LoginRequest {
            email: "owner@example.com".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(h.client.session().access_token().as_deref(), Some("A1"));
    assert_eq!(h.store.load().unwrap().refresh.unwrap().value, "R1");
    assert_eq!(h.client.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn rejected_login_does_not_refresh() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusCode": 401,
            "message": "Password is incorrect"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(refresh_ok(Duration::ZERO))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .login(&LoginRequest {
            email: "owner@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.envelope().unwrap().message, "Password is incorrect");
    assert!(h.client.session().access_token().is_none());
}
