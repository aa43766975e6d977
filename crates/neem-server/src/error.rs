use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use neem_core::NeemError;
use rosprolog_client::PrologError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(NeemError::InvalidPayload(msg.into()).into())
    }

    fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<NeemError>() {
            return match e {
                NeemError::Prolog(p) => prolog_status(p),
                NeemError::NotFound(_)
                | NeemError::MissingBinding { .. }
                | NeemError::InvalidPayload(_)
                | NeemError::InvalidPose(_) => StatusCode::BAD_REQUEST,
                NeemError::UnknownQuery(_) => StatusCode::NOT_FOUND,
                NeemError::Config(_)
                | NeemError::Io(_)
                | NeemError::Yaml(_)
                | NeemError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
        }
        if let Some(p) = self.0.downcast_ref::<PrologError>() {
            return prolog_status(p);
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn prolog_status(e: &PrologError) -> StatusCode {
    match e {
        PrologError::NoSolution(_) => StatusCode::BAD_REQUEST,
        PrologError::Transport(_)
        | PrologError::Rejected { .. }
        | PrologError::QueryFailed(_)
        | PrologError::WrongId(_)
        | PrologError::Parse { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, "{:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_solution_maps_to_400() {
        let err = AppError(PrologError::NoSolution("member(X, [])".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wrapped_no_solution_maps_to_400() {
        let err = AppError(NeemError::from(PrologError::NoSolution("q".into())).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_400() {
        let err = AppError(NeemError::NotFound("Failed to find any actions".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_binding_maps_to_400() {
        let err = AppError(
            NeemError::MissingBinding {
                var: "Action".into(),
                query: "q".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_query_maps_to_404() {
        let err = AppError(NeemError::UnknownQuery("nope".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn query_failed_maps_to_502() {
        let err = AppError(NeemError::from(PrologError::QueryFailed("boom".into())).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rejected_maps_to_502() {
        let err = AppError(
            PrologError::Rejected {
                query: "q".into(),
                message: "syntax error".into(),
            }
            .into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn config_error_maps_to_500() {
        let err = AppError(NeemError::Config("bad".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("missing field");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(NeemError::UnknownQuery("nope".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
