use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use super::*;
use crate::{
    backend::{CompletionError, MockCompletion},
    chat::{MessageEvents, ResponseRouter},
    crisis::CrisisDetector,
    identity::{IdentityError, MockIdentity},
    server::AppState,
    storage::{Storage, sqlite::Sqlite},
};

fn identity() -> MockIdentity {
    let mut identity = MockIdentity::new();
    identity.expect_verify().returning(|token| match token {
        "token-1" => Ok(User::new("user-1")),
        "token-2" => Ok(User::new("user-2")),
        _ => Err(IdentityError::InvalidToken),
    });
    identity
}

fn completion(reply: Result<&'static str, u16>) -> MockCompletion {
    let mut completion = MockCompletion::new();
    completion.expect_name().return_const("mock".to_string());
    completion.expect_complete().returning(move |_| match reply {
        Ok(text) => Ok(text.to_string()),
        Err(429) => Err(CompletionError::RateLimited),
        Err(402) => Err(CompletionError::Unavailable),
        Err(status) => Err(CompletionError::Upstream {
            status,
            body: "upstream exploded".to_string(),
        }),
    });
    completion
}

fn completion_never_called() -> MockCompletion {
    let mut completion = MockCompletion::new();
    completion.expect_name().return_const("mock".to_string());
    completion.expect_complete().times(0);
    completion
}

async fn setup(completion: MockCompletion) -> (Router, Arc<Sqlite>) {
    let db = Arc::new(Sqlite::new(None).await.unwrap());
    let events = MessageEvents::default();
    let router = ResponseRouter::new(
        Arc::new(CrisisDetector::default()),
        db.clone(),
        Arc::new(completion),
        events.clone(),
    );
    let state = Arc::new(AppState {
        storage: db.clone(),
        identity: Arc::new(identity()),
        router: Arc::new(router),
        events,
    });
    (build(state, &ServerConfig::default()), db)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_public_routes() {
    let (app, _) = setup(completion_never_called()).await;

    let (status, body) = send(&app, request("GET", "/healthz", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], config::VERSION);
    assert_eq!(body["revision"], config::GIT_SHA);

    let (status, body) = send(&app, request("GET", "/api/crisis-resources", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let phones = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["phone"].as_str())
        .collect::<Vec<_>>();
    assert!(phones.contains(&"112"));
    assert!(phones.contains(&"1800-599-0019"));
}

#[tokio::test]
async fn test_chat_requires_authentication() {
    let (app, db) = setup(completion_never_called()).await;
    let body = json!({ "message": "hello" });

    let (status, resp) = send(&app, request("POST", "/api/chat", None, Some(body.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp, json!({ "error": "Unauthorized" }));

    let (status, resp) = send(
        &app,
        request("POST", "/api/chat", Some("expired"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp, json!({ "error": "Unauthorized" }));

    let req = Request::builder()
        .method("GET")
        .uri("/api/profile")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(db.get_profile("user-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_chat_normal_turn() {
    let (app, _) = setup(completion(Ok("That sounds really hard."))).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-1"),
            Some(json!({ "message": "I had a rough day", "conversationId": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "response": "That sounds really hard.", "isCrisis": false })
    );
}

#[tokio::test]
async fn test_chat_crisis_turn() {
    let (app, _) = setup(completion_never_called()).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-1"),
            Some(json!({ "message": "I feel like I'd be better off dead" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isCrisis"], true);
    let text = body["response"].as_str().unwrap();
    assert!(text.contains("112"));
    assert!(text.contains("1800-599-0019"));
}

#[tokio::test]
async fn test_chat_upstream_errors() {
    let cases = [
        (
            429,
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again in a moment.",
        ),
        (
            402,
            StatusCode::PAYMENT_REQUIRED,
            "AI service temporarily unavailable. Please try again later.",
        ),
        (
            503,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get a response. Please try again.",
        ),
    ];

    for (upstream, expected_status, expected_message) in cases {
        let (app, _) = setup(completion(Err(upstream))).await;
        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/chat",
                Some("token-1"),
                Some(json!({ "message": "hello" })),
            ),
        )
        .await;
        assert_eq!(status, expected_status, "upstream {upstream}");
        assert_eq!(body, json!({ "error": expected_message }));
    }
}

#[tokio::test]
async fn test_chat_rejects_invalid_bodies() {
    let (app, _) = setup(completion_never_called()).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-1"),
            Some(json!({ "message": "  " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "message is empty");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-1"),
            Some(json!({ "text": "wrong field" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_profile_settings() {
    let (app, _) = setup(completion_never_called()).await;

    let (status, body) = send(&app, request("GET", "/api/profile", Some("token-1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "saveChats": false }));

    let (status, body) = send(
        &app,
        request(
            "PUT",
            "/api/profile",
            Some("token-1"),
            Some(json!({ "saveChats": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "saveChats": true }));

    let (_, body) = send(&app, request("GET", "/api/profile", Some("token-1"), None)).await;
    assert_eq!(body, json!({ "saveChats": true }));

    let (_, body) = send(&app, request("GET", "/api/profile", Some("token-2"), None)).await;
    assert_eq!(body, json!({ "saveChats": false }));
}

#[tokio::test]
async fn test_conversation_lifecycle() {
    let (app, db) = setup(completion(Ok("I'm here for you."))).await;
    db.upsert_profile(Profile::new("user-1").with_save_chats(true))
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-1"),
            Some(json!({ "message": "Can we talk?" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversation_id = body["conversationId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request("GET", "/api/conversations", Some("token-1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], conversation_id.as_str());

    let uri = format!("/api/conversations/{conversation_id}/messages");
    let (status, body) = send(&app, request("GET", &uri, Some("token-1"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["sender"], "user");
    assert_eq!(body[0]["content"], "Can we talk?");
    assert_eq!(body[1]["sender"], "assistant");
    assert_eq!(body[1]["content"], "I'm here for you.");

    // Another user cannot see it.
    let (status, body) = send(&app, request("GET", &uri, Some("token-2"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "conversation not found" }));

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/chat",
            Some("token-2"),
            Some(json!({ "message": "hi", "conversationId": conversation_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        request("DELETE", "/api/conversations", Some("token-1"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": 1 }));

    let (_, body) = send(
        &app,
        request("GET", "/api/conversations", Some("token-1"), None),
    )
    .await;
    assert_eq!(body, json!([]));
    assert!(db.get_messages(&conversation_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_conversation_events_checks_ownership() {
    let (app, db) = setup(completion_never_called()).await;
    db.create_conversation(Conversation::new("user-1").with_id("conv-1"))
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        request("GET", "/api/conversations/conv-1/events", Some("token-2"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/conversations/conv-1/events",
            Some("token-1"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "text/event-stream");
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = setup(completion_never_called()).await;
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/chat")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    };

    let res = app.clone().oneshot(preflight("https://anywhere.test")).await.unwrap();
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let config = ServerConfig {
        cors_allowed_origins: vec!["https://app.example.com".to_string()],
        ..Default::default()
    };
    let db = Arc::new(Sqlite::new(None).await.unwrap());
    let state = Arc::new(AppState {
        storage: db.clone(),
        identity: Arc::new(identity()),
        router: Arc::new(ResponseRouter::new(
            Arc::new(CrisisDetector::default()),
            db,
            Arc::new(completion_never_called()),
            MessageEvents::default(),
        )),
        events: MessageEvents::default(),
    });
    let app = build(state, &config);

    let res = app.clone().oneshot(preflight("https://app.example.com")).await.unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let res = app.oneshot(preflight("https://evil.test")).await.unwrap();
    assert!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}
