use rosprolog_client::PrologError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeemError {
    #[error(transparent)]
    Prolog(#[from] PrologError),

    #[error("{0}")]
    NotFound(String),

    #[error("solution has no binding for '{var}' in query: {query}")]
    MissingBinding { var: String, query: String },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid pose: {0}")]
    InvalidPose(String),

    #[error("unknown query: {0}")]
    UnknownQuery(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl NeemError {
    /// True when the reasoner answered but found nothing, as opposed to a
    /// transport or protocol failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            NeemError::NotFound(_) | NeemError::Prolog(PrologError::NoSolution(_))
        )
    }
}

pub type Result<T> = std::result::Result<T, NeemError>;
