use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use neem_core::payload::{deserialize_f64, normalize_additional_info};
use neem_core::VrSubAction;
use serde::Deserialize;
use serde_json::Value;

use super::{body, respond};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubActionBody {
    pub parent_action_iri: String,
    pub sub_action_type: String,
    pub task_type: String,
    #[serde(deserialize_with = "deserialize_f64")]
    pub start_time: f64,
    #[serde(deserialize_with = "deserialize_f64")]
    pub end_time: f64,
    /// `"[Class:Individual,...]"` or a JSON list of `Class:Individual` strings.
    #[serde(default)]
    pub objects_participated: Value,
    #[serde(default)]
    pub additional_event_info: Value,
    pub game_participant: String,
}

#[derive(Deserialize)]
pub struct PouringBody {
    pub sub_action_type: String,
    pub time_interval: String,
    #[serde(default)]
    pub additional_event_info: Value,
}

fn objects_list(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            format!("[{}]", items.join(","))
        }
        _ => String::new(),
    }
}

impl SubActionBody {
    fn into_sub_action(self) -> neem_core::Result<VrSubAction> {
        Ok(VrSubAction {
            additional_info: normalize_additional_info(&self.additional_event_info)?,
            objects_participated: objects_list(&self.objects_participated),
            parent_action_iri: self.parent_action_iri,
            sub_action_type: self.sub_action_type,
            task_type: self.task_type,
            start_time: self.start_time,
            end_time: self.end_time,
            participant: self.game_participant,
        })
    }
}

/// GET|POST /knowrob/api/v1.0/add_subaction_with_task
pub async fn add_subaction_with_task(
    State(app): State<AppState>,
    payload: Result<Json<SubActionBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let req = body(payload)?;
    let data = app.data.clone();
    let result = tokio::task::spawn_blocking(move || {
        let sub = req.into_sub_action()?;
        data.add_subaction_with_task(&sub)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(respond(result))
}

/// GET|POST /knowrob/api/v1.0/add_additional_pouring_information
pub async fn add_additional_pouring_information(
    State(app): State<AppState>,
    payload: Result<Json<PouringBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let req = body(payload)?;
    let data = app.data.clone();
    let result = tokio::task::spawn_blocking(move || {
        let info = normalize_additional_info(&req.additional_event_info)?;
        data.add_additional_pouring_information(&req.sub_action_type, info.as_ref(), &req.time_interval)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(respond(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_accepts_string_or_list() {
        assert_eq!(objects_list(&json!("[Cup:BlueCup]")), "[Cup:BlueCup]");
        assert_eq!(objects_list(&json!(["Cup:BlueCup", "Bowl:Bowl"])), "[Cup:BlueCup,Bowl:Bowl]");
        assert_eq!(objects_list(&json!(null)), "");
    }

    #[test]
    fn body_accepts_string_times() {
        let body: SubActionBody = serde_json::from_value(json!({
            "parent_action_iri": "act_0",
            "sub_action_type": "soma:'Grasping'",
            "task_type": "soma:'Grasping'",
            "start_time": "1.5",
            "end_time": 2,
            "objects_participated": "[]",
            "additional_event_info": "{'SCName': 'Cup'}",
            "game_participant": "Alice"
        }))
        .unwrap();
        let sub = body.into_sub_action().unwrap();
        assert_eq!(sub.start_time, 1.5);
        assert_eq!(sub.end_time, 2.0);
        assert_eq!(sub.additional_info, Some(json!({"SCName": "Cup"})));
    }
}
