use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::respond;
use crate::error::AppError;
use crate::state::AppState;

/// GET /knowrob/api/v1.0/:function: run a canned NEEM-data query by name.
pub async fn run_query(
    State(app): State<AppState>,
    Path(function): Path<String>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let data = app.data.clone();
    let result = tokio::task::spawn_blocking(move || data.run_named(&function))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(respond(result))
}

/// GET /knowrob/api/v1.0/health
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
