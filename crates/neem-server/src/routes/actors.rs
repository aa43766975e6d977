use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::{body, respond};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateActorBody {
    pub actor_name: String,
}

/// GET|POST /knowrob/api/v1.0/create_actor_by_given_name
pub async fn create_actor_by_given_name(
    State(app): State<AppState>,
    payload: Result<Json<CreateActorBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let req = body(payload)?;
    let data = app.data.clone();
    let result = tokio::task::spawn_blocking(move || data.create_actor_by_given_name(&req.actor_name))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(respond(result))
}
