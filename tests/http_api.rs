use ratecontrol::application::IntervalStore;
use ratecontrol::application::usecases::{RateGate, ResolveIntervalUseCase, SetIntervalUseCase};
use ratecontrol::domain::{CallerId, IntervalMs, IntervalPolicy};
use ratecontrol::infrastructure::{
    clock::TokioClock, log_sink::LogSink, memory_store::InMemoryIntervalStore,
};
use ratecontrol::interfaces::http_api::{ApiState, CALLER_HEADER, build_router};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store: Arc<dyn IntervalStore> = Arc::new(InMemoryIntervalStore::new());
    let resolver = ResolveIntervalUseCase::new(
        store.clone(),
        IntervalPolicy::new(IntervalMs::from_millis(1000)),
    );
    let gate = RateGate::new(
        resolver.clone(),
        Arc::new(TokioClock::new()),
        Arc::new(LogSink::new()),
    );
    build_router(ApiState {
        gate: Arc::new(gate),
        resolver,
        set_interval: Arc::new(SetIntervalUseCase::new(store, vec![CallerId::new("alice")])),
    })
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn put_interval(channel: &str, caller: Option<&str>, value: i64) -> Request<Body> {
    let mut req = Request::put(format!("/channels/{channel}/interval"))
        .header("content-type", "application/json");
    if let Some(c) = caller {
        req = req.header(CALLER_HEADER, c);
    }
    req.body(Body::from(format!(r#"{{"interval_ms":{value}}}"#)))
        .unwrap()
}

fn get_interval(channel: &str) -> Request<Body> {
    Request::get(format!("/channels/{channel}/interval"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, _) = call(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn set_then_get_reports_override() {
    let app = app();

    let (status, body) = call(&app, get_interval("G1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interval_ms"], 1000);
    assert_eq!(body["overridden"], false);

    let (status, body) = call(&app, put_interval("G1", Some("alice"), 200)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interval_ms"], 200);

    let (_, body) = call(&app, get_interval("G1")).await;
    assert_eq!(body["interval_ms"], 200);
    assert_eq!(body["overridden"], true);
}

#[tokio::test]
async fn set_requires_allow_listed_caller() {
    let app = app();

    let (status, _) = call(&app, put_interval("G1", Some("mallory"), 200)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, put_interval("G1", None, 200)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call(&app, get_interval("G1")).await;
    assert_eq!(body["overridden"], false);
}

#[tokio::test]
async fn negative_value_is_bad_request() {
    let app = app();
    let (status, body) = call(&app, put_interval("G1", Some("alice"), -1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("-1"));
}

#[tokio::test(start_paused = true)]
async fn outbound_reports_gate_decision() {
    let app = app();
    let send = || {
        Request::post("/channels/G1/messages")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"payload":"hello"}"#))
            .unwrap()
    };

    let (_, body) = call(&app, send()).await;
    assert_eq!(body["proceed"], true);
    assert!(body["scheduled_at_ms"].is_null());

    let (_, body) = call(&app, send()).await;
    assert_eq!(body["proceed"], false);
    assert_eq!(body["scheduled_at_ms"], 1000);
}
