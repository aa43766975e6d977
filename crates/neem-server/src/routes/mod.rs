pub mod actions;
pub mod actors;
pub mod data;
pub mod episodes;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::error::AppError;

/// Truthiness of a JSON result: null, false, zero and empty values are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The result as body, with 200 when it is truthy and 400 otherwise.
pub fn respond(result: Value) -> (StatusCode, Json<Value>) {
    let status = if is_truthy(&result) {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(result))
}

/// Unwrap a JSON body, turning extractor rejections into `{"error": ..}` 400s.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(b)| b)
        .map_err(|e| AppError::bad_request(e.body_text()))
}
