use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::AppError;
use crate::application::usecases::{RateGate, ResolveIntervalUseCase, SetIntervalUseCase};
use crate::domain::{CallerId, ChannelId, GateDecision, OutboundMessage};

pub const CALLER_HEADER: &str = "x-caller-id";

#[derive(Clone)]
pub struct ApiState {
    pub gate: Arc<RateGate>,
    pub resolver: ResolveIntervalUseCase,
    pub set_interval: Arc<SetIntervalUseCase>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/channels/:channel/interval",
            get(get_interval).put(put_interval),
        )
        .route("/channels/:channel/messages", axum::routing::post(outbound))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[derive(Serialize)]
struct IntervalView {
    channel: String,
    interval_ms: u64,
    overridden: bool,
}

async fn get_interval(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
) -> Response {
    let channel = match ChannelId::parse(&channel) {
        Ok(c) => c,
        Err(e) => return error_response(AppError::from(e)),
    };
    let effective = state.resolver.effective(&channel).await;
    Json(IntervalView {
        channel: channel.to_string(),
        interval_ms: effective.interval_ms.as_millis(),
        overridden: effective.overridden,
    })
    .into_response()
}

#[derive(Deserialize)]
struct SetIntervalBody {
    interval_ms: i64,
}

async fn put_interval(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SetIntervalBody>,
) -> Response {
    let Some(caller) = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(CallerId::new)
    else {
        return error_response(AppError::PermissionDenied(format!(
            "request without {CALLER_HEADER}"
        )));
    };

    match state
        .set_interval
        .execute(&caller, &channel, body.interval_ms)
        .await
    {
        Ok(interval) => Json(IntervalView {
            channel,
            interval_ms: interval.as_millis(),
            overridden: true,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct OutboundBody {
    payload: String,
}

#[derive(Serialize)]
struct OutboundView {
    proceed: bool,
    scheduled_at_ms: Option<u64>,
}

async fn outbound(
    State(state): State<ApiState>,
    Path(channel): Path<String>,
    Json(body): Json<OutboundBody>,
) -> Response {
    let decision = state
        .gate
        .on_outbound_message(OutboundMessage::new(channel, body.payload))
        .await;
    let scheduled_at_ms = match decision {
        GateDecision::Proceed => None,
        GateDecision::Suppress { scheduled_at_ms } => Some(scheduled_at_ms),
    };
    Json(OutboundView {
        proceed: decision.should_send(),
        scheduled_at_ms,
    })
    .into_response()
}

fn error_response(e: AppError) -> Response {
    let code = match &e {
        AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        AppError::InvalidChannel(_) | AppError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
        AppError::Storage(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (code, Json(json!({ "error": e.to_string() }))).into_response()
}
