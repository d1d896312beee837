//! HTTP trigger boundary.
//!
//! Thin front over [`TriggerReceiver`] and the execution store. A trigger
//! acknowledgement is a 200 with the execution id; a rejected payload is a
//! 500 with an `error` field and creates no execution. Outcomes are read
//! back from `/executions/{execution_id}`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

use freesia_store::{ExecutionRecord, Store};
use freesia_trigger::{TriggerReceiver, TriggerResponse};

#[derive(Clone)]
struct AppState {
  receiver: Arc<TriggerReceiver>,
  store: Arc<dyn Store>,
}

/// Build the router for the trigger boundary.
fn create_app(receiver: Arc<TriggerReceiver>, store: Arc<dyn Store>) -> Router {
  let state = AppState { receiver, store };

  Router::new()
    .route("/healthz", get(health_check))
    .route("/trigger", post(trigger))
    .route("/executions", get(list_executions))
    .route("/executions/{execution_id}", get(get_execution))
    .with_state(state)
}

/// Serve the trigger boundary until interrupted, then let in-flight
/// executions settle.
pub async fn start(receiver: TriggerReceiver, store: Arc<dyn Store>, addr: &str) -> Result<()> {
  let receiver = Arc::new(receiver);
  let app = create_app(Arc::clone(&receiver), store);

  let listener = TcpListener::bind(addr)
    .await
    .with_context(|| format!("failed to bind {addr}"))?;
  info!(addr = %addr, "server_listening");

  axum::serve(listener, app.into_make_service())
    .with_graceful_shutdown(async {
      tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    })
    .await?;

  receiver.shutdown().await;

  Ok(())
}

async fn health_check() -> &'static str {
  "ok"
}

async fn trigger(
  State(state): State<AppState>,
  body: String,
) -> Result<Json<TriggerResponse>, (StatusCode, Json<Value>)> {
  // Parse the body by hand so unparseable payloads get the same error shape
  // as rejected ones.
  let payload: Value = serde_json::from_str(&body).map_err(|e| {
    warn!(error = %e, "trigger_body_unparseable");
    error_response(format!("invalid JSON payload: {e}"))
  })?;

  let response = state.receiver.trigger(&payload).await.map_err(|e| {
    warn!(error = %e, "trigger_rejected");
    error_response(e.to_string())
  })?;

  Ok(Json(response))
}

async fn get_execution(
  State(state): State<AppState>,
  Path(execution_id): Path<String>,
) -> Result<Json<ExecutionRecord>, (StatusCode, Json<Value>)> {
  state
    .store
    .get_execution(&execution_id)
    .await
    .map(Json)
    .map_err(|e| (StatusCode::NOT_FOUND, Json(json!({ "error": e.to_string() }))))
}

async fn list_executions(
  State(state): State<AppState>,
) -> Result<Json<Vec<ExecutionRecord>>, (StatusCode, Json<Value>)> {
  state
    .store
    .list_executions()
    .await
    .map(Json)
    .map_err(|e| error_response(e.to_string()))
}

fn error_response(message: String) -> (StatusCode, Json<Value>) {
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "error": message })),
  )
}
