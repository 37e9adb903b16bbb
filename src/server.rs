use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::command;
use crate::config::{CommandConfig, ServerConfig};
use crate::dispatcher::Dispatcher;
use crate::sanitize;
use crate::settings::{ChannelSettings, SettingField};
use crate::types::OrchestrationJob;

#[derive(Clone)]
pub struct ServerState {
    pub dispatcher: Arc<Dispatcher>,
    pub command: CommandConfig,
}

/// Inbound webhook payload. Extra fields from the host platform are ignored.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub settings: Vec<SettingField>,
}

/// What the trigger should do with a payload.
#[derive(Debug)]
pub enum TriggerDecision {
    /// No recognized command prefix: 204, zero work.
    Ignore,
    /// A recognized command with a delivery destination.
    Dispatch(OrchestrationJob),
    /// A recognized command but no channelUrl: acknowledged, nothing to do.
    AcceptWithoutChannel,
}

/// Decide synchronously; all per-invocation context is captured here so the
/// dispatched job needs no environment lookups.
pub fn decide(payload: &WebhookPayload, config: &CommandConfig) -> TriggerDecision {
    let text = sanitize::strip_html(&payload.message);
    let Some(cmd) = command::parse(text.trim(), &config.prefix, &config.greeting) else {
        return TriggerDecision::Ignore;
    };

    let settings = ChannelSettings::from_fields(&payload.settings);
    let Some(channel_url) = settings.channel_url.clone() else {
        warn!("Command accepted but no channelUrl is configured; skipping run");
        return TriggerDecision::AcceptWithoutChannel;
    };

    TriggerDecision::Dispatch(OrchestrationJob {
        channel_url,
        text: cmd.body,
        settings,
    })
}

pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/integration.json", get(integration_handler))
        .route("/webhook", post(webhook_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "devbot integration",
        "specification_url": "/integration.json",
        "target_url": "/webhook"
    }))
}

async fn integration_handler() -> Json<Value> {
    Json(integration_descriptor())
}

/// Static descriptor the host platform renders into a configuration UI.
pub fn integration_descriptor() -> Value {
    json!({
        "data": {
            "descriptions": {
                "app_name": "devbot",
                "app_description": "Fetches the latest GitHub Actions deployment log for your repository, or answers DevOps questions in-channel.",
                "app_url": "/",
                "background_color": "#24292e"
            },
            "integration_type": "modifier",
            "settings": [
                { "label": "channelUrl", "type": "text", "required": true, "default": "" },
                { "label": "repoOwner", "type": "text", "required": true, "default": "" },
                { "label": "githubRepo", "type": "text", "required": true, "default": "" },
                { "label": "githubPAT", "type": "text", "required": true, "default": "" }
            ],
            "target_url": "/webhook"
        }
    })
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Not Found",
            "status": 404,
            "specification_url": "/integration.json"
        })),
    )
}

async fn webhook_handler(
    State(state): State<ServerState>,
    Json(payload): Json<WebhookPayload>,
) -> impl IntoResponse {
    match decide(&payload, &state.command) {
        TriggerDecision::Ignore => StatusCode::NO_CONTENT.into_response(),
        TriggerDecision::AcceptWithoutChannel => accepted_response(),
        TriggerDecision::Dispatch(job) => {
            state.dispatcher.dispatch(job);
            accepted_response()
        }
    }
}

/// The trigger always answers before the orchestrator runs.
fn accepted_response() -> axum::response::Response {
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "request processing" })),
    )
        .into_response()
}

pub async fn start_server(state: ServerState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = build_router(state);

    let ip: std::net::IpAddr = config
        .bind
        .parse()
        .unwrap_or_else(|_| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let addr = std::net::SocketAddr::new(ip, config.port);
    info!("devbot listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
