use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use neem_core::payload::deserialize_opt_f64;
use serde::Deserialize;
use serde_json::Value;

use super::{body, respond};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateEpisodeBody {
    pub game_participant: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub game_start_time: Option<f64>,
}

#[derive(Deserialize)]
pub struct FinishEpisodeBody {
    pub episode_iri: String,
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub game_end_time: Option<f64>,
}

/// GET|POST /knowrob/api/v1.0/create_episode: register the participant and
/// start a VR episode performed by them.
pub async fn create_episode(
    State(app): State<AppState>,
    payload: Result<Json<CreateEpisodeBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let req = body(payload)?;
    let data = app.data.clone();
    let result = tokio::task::spawn_blocking(move || {
        data.create_episode(&req.game_participant, req.game_start_time)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(episode = ?result.get("Episode"), "episode created");
    Ok(respond(result))
}

/// GET|POST /knowrob/api/v1.0/finish_episode
pub async fn finish_episode(
    State(app): State<AppState>,
    payload: Result<Json<FinishEpisodeBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let req = body(payload)?;
    let data = app.data.clone();
    let episode = req.episode_iri.clone();
    let result = tokio::task::spawn_blocking(move || {
        data.finish_episode(&req.episode_iri, req.game_end_time)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    tracing::info!(episode = %episode, "episode finished");
    Ok(respond(result))
}
