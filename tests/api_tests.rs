use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use skinsight::app::StatusResponse;
use skinsight::chat::fake::FakeChatClient;
use skinsight::chat::ChatClientTrait;
use skinsight::fallback::{
    fallback_recommendation, goal_fragment, skin_type_entry,
    SERVICE_FAILURE_FIT_SCORE, UNPARSEABLE_FIT_SCORE,
};
use skinsight::skin::{SkinGoal, SkinType};
use skinsight::test_utils::init_test_logging;
use skinsight::AppState;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Create a test app backed by the given fake client
fn app_with(client: Option<Arc<dyn ChatClientTrait>>) -> (Arc<AppState>, Router) {
    let app_state = Arc::new(AppState::new_for_testing_with_client(client));
    let routes = skinsight::app::routes(app_state.clone());
    (app_state, routes)
}

fn fake(client: FakeChatClient) -> Option<Arc<dyn ChatClientTrait>> {
    Some(Arc::new(client))
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(router: Router, uri: &str) -> Value {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    init_test_logging();
    let (_, router) = app_with(None);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_not_found() {
    init_test_logging();
    let (_, router) = app_with(None);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_evaluate_clamps_ai_score() {
    init_test_logging();
    let (_, router) = app_with(fake(FakeChatClient::new().with_response(
        r#"Here is the evaluation you asked for:
{"fitScore": 150, "verdict": "great", "insights": [], "recommendation": "x"}"#,
    )));

    let (status, body) = post_json(
        router,
        "/api/evaluate",
        json!({"productName": "Vitamin C Serum", "skinType": "normal"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "fitScore": 100,
            "verdict": "great",
            "insights": [],
            "recommendation": "x"
        })
    );
}

#[tokio::test]
async fn test_evaluate_prose_reply_uses_fallback_table() {
    init_test_logging();
    let (state, router) = app_with(fake(
        FakeChatClient::new().with_response("Honestly it looks great to me!"),
    ));

    let (status, body) = post_json(
        router,
        "/api/evaluate",
        json!({
            "productName": "Overnight Mask",
            "skinType": "dry",
            "goals": ["acne", "glow"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let dry = skin_type_entry(Some(SkinType::Dry));
    assert_eq!(body["fitScore"], json!(UNPARSEABLE_FIT_SCORE));
    assert_eq!(
        body["recommendation"],
        json!(format!(
            "{}. {} {}.",
            dry.recommendation,
            goal_fragment(SkinGoal::Acne),
            goal_fragment(SkinGoal::Glow)
        ))
    );
    assert_eq!(body["insights"], json!(dry.insights));
    assert_eq!(
        state
            .stats
            .unparseable_fallback_count
            .load(std::sync::atomic::Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_evaluate_without_service() {
    init_test_logging();
    let (_, router) = app_with(None);

    let (status, body) = post_json(
        router,
        "/api/evaluate",
        json!({"productName": "Clay Mask", "skinType": "dry"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fitScore"], json!(SERVICE_FAILURE_FIT_SCORE));
    assert_eq!(body["verdict"], json!("caution"));
    assert_eq!(
        body["recommendation"],
        json!(fallback_recommendation(Some(SkinType::Dry), &[]))
    );
}

#[tokio::test]
async fn test_evaluate_unknown_skin_type_is_accepted() {
    init_test_logging();
    for skin_type in ["oily", "dry", "combination", "sensitive", "normal", "lizard"] {
        let (_, router) = app_with(fake(
            FakeChatClient::new().with_failure("upstream 500"),
        ));
        let (status, body) = post_json(
            router,
            "/api/evaluate",
            json!({"productName": "Face Oil", "skinType": skin_type}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let score = body["fitScore"].as_u64().unwrap();
        assert!(score <= 100);
        let verdict = body["verdict"].as_str().unwrap();
        assert!(["great", "good", "caution"].contains(&verdict));
    }
}

#[tokio::test]
async fn test_evaluate_rejects_blank_product_name() {
    init_test_logging();
    let (_, router) = app_with(None);

    let (status, _) =
        post_json(router, "/api/evaluate", json!({"productName": "   "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_insight_endpoint() {
    init_test_logging();
    let (_, router) = app_with(fake(
        FakeChatClient::new().with_response(
            r#"{"insight": "Your hydration has improved steadily."}"#,
        ),
    ));

    let (status, body) = post_json(
        router,
        "/api/progress/insight",
        json!({
            "metrics": [
                {"label": "Hydration", "value": 68, "trend": "up"},
                {"label": "Redness", "value": 30, "trend": "down"}
            ],
            "daysTracked": 12
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"insight": "Your hydration has improved steadily."})
    );
}

#[tokio::test]
async fn test_photo_analysis_endpoint_bounds_metrics() {
    init_test_logging();
    let (_, router) = app_with(fake(FakeChatClient::new().with_response(
        r#"{"metrics": [{"label": "Texture", "value": 400, "trend": "wild"}], "insight": 12}"#,
    )));

    let (status, body) = post_json(
        router,
        "/api/progress/photos",
        json!({
            "current": {"front": true, "left": true},
            "previous": {"front": true}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let metrics = body["metrics"].as_array().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0]["value"], json!(100.0));
    assert_eq!(metrics[0]["trend"], json!("neutral"));
    assert_eq!(metrics[0]["isGood"], json!(true));
    assert!(body["insight"].as_str().is_some());
}

#[tokio::test]
async fn test_status_reports_outcomes() {
    init_test_logging();
    let (state, router) = app_with(fake(
        FakeChatClient::new()
            .with_response(r#"{"fitScore": 80}"#)
            .with_failure("timeout"),
    ));

    for _ in 0..2 {
        let (status, _) = post_json(
            router.clone(),
            "/api/evaluate",
            json!({"productName": "Gel Cleanser"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let status: StatusResponse =
        serde_json::from_value(get_json(router, "/api/status").await).unwrap();
    assert_eq!(status.model, state.insight_settings.model);
    assert!(status.chat_available);
    assert_eq!(status.stats.request_count, 2);
    assert_eq!(status.stats.ai_count, 1);
    assert_eq!(status.stats.service_failure_fallback_count, 1);
    assert_eq!(status.stats.unparseable_fallback_count, 0);
    assert!(!status.version.is_empty());
}

// Exercise the full stack over a real socket
#[tokio::test]
async fn test_with_real_server() {
    init_test_logging();
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (_state, router) = app_with(fake(
        FakeChatClient::new().with_chunks(vec![
            "{\"fitScore\": 64, ",
            "\"verdict\": \"good\"}",
        ]),
    ));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/api/evaluate", addr))
        .json(&json!({"productName": "Peptide Serum", "goals": ["protect"]}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["fitScore"], json!(64));
    assert_eq!(body["verdict"], json!("good"));
}
