use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use quiz_core::time::fixed_clock;
use serde_json::{Value, json};
use server::{router, state::State};
use services::{AppServices, CompletionClient, CompletionError, CompletionPrompt};
use storage::Storage;
use tower::ServiceExt;

#[derive(Default)]
struct ScriptedCompletion {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<CompletionPrompt>>,
}

impl ScriptedCompletion {
    fn with_replies(replies: impl IntoIterator<Item = Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|v| v.to_string()).collect()),
            prompts: Mutex::default(),
        })
    }

    fn temperatures(&self) -> Vec<f64> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.temperature)
            .collect()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, prompt: &CompletionPrompt) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(CompletionError::Disabled)
    }
}

fn question(text: &str) -> Value {
    json!({ "question": text, "options": ["a", "b", "c", "d"], "answer": "a" })
}

fn app(generator: Arc<ScriptedCompletion>) -> Router {
    let services = AppServices::from_parts(fixed_clock(), &Storage::in_memory(), generator);
    router(State::new(&services))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn register_login_and_scores() {
    let app = app(Arc::new(ScriptedCompletion::default()));
    let alice = json!({ "username": "alice", "email": "alice@example.com", "password": "pw" });

    let (status, body) = send(&app, "POST", "/api/register", Some(alice.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());
    let user_id = body["user"]["id"].as_u64().unwrap();

    let (status, body) = send(&app, "POST", "/api/register", Some(alice)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "email": "alice@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user_id);

    for (topic, score) in [("Math", 3), ("Science", 5)] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/scores",
            Some(json!({
                "user_id": user_id,
                "topic": topic,
                "score": score,
                "total_questions": 5
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Score saved successfully");
        assert_eq!(body["score"]["topic"], topic);
    }

    let (status, body) = send(&app, "GET", &format!("/api/scores/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let scores = body.as_array().unwrap();
    assert_eq!(scores.len(), 2);
    // Same timestamp under the fixed clock, so the later id comes first.
    assert_eq!(scores[0]["topic"], "Science");
}

#[tokio::test]
async fn score_errors_use_public_messages() {
    let app = app(Arc::new(ScriptedCompletion::default()));

    let (status, body) = send(
        &app,
        "POST",
        "/api/scores",
        Some(json!({ "user_id": 999, "topic": "Math", "score": 1, "total_questions": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save score");

    let (status, body) = send(&app, "GET", "/api/scores/not-a-number", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to retrieve scores");

    let (status, body) = send(&app, "GET", "/api/scores/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn static_quiz_is_fixed() {
    let app = app(Arc::new(ScriptedCompletion::default()));
    let (status, body) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "questions": [
            { "question": "What is 2 + 2?", "options": ["3", "4", "5"], "answer": "4" }
        ]})
    );
}

#[tokio::test]
async fn ai_quiz_filters_repeats_and_escalates_refreshes() {
    let first = json!({ "questions": [
        question("What is the capital of France?"),
        question("What is the largest ocean on Earth?"),
    ]});
    let second = json!({ "questions": [
        question("What is the capital of France?"),
        question("Which desert is the largest hot desert?"),
        question("Which river is the longest in Africa?"),
    ]});
    let generator = ScriptedCompletion::with_replies([first, second]);
    let app = app(Arc::clone(&generator));

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai-quiz",
        Some(json!({ "topic": "Geography", "count": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["question"], "What is the capital of France?");

    let (status, body) = send(
        &app,
        "POST",
        "/api/ai-quiz",
        Some(json!({
            "topic": "Geography",
            "count": 2,
            "refreshId": 1_700_000_000_000_u64,
            "refreshCount": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["question"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec![
            "Which desert is the largest hot desert?",
            "Which river is the longest in Africa?"
        ]
    );

    let temps = generator.temperatures();
    assert_eq!(temps.len(), 2);
    assert!((temps[0] - 0.7).abs() < 1e-9);
    assert!((temps[1] - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn ai_quiz_without_generator_serves_fallback() {
    let app = app(Arc::new(ScriptedCompletion::default()));
    let (status, body) = send(&app, "POST", "/api/ai-quiz", Some(json!({ "topic": "Math" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "questions": [
            { "question": "What is 2 + 2?", "options": ["3", "4", "5", "6"], "answer": "4" }
        ]})
    );
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app(Arc::new(ScriptedCompletion::default()));
    let request = Request::builder()
        .method("POST")
        .uri("/api/register")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
