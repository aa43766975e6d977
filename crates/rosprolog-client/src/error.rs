use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrologError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("query rejected by reasoner: {message}\n  query: {query}")]
    Rejected { query: String, message: String },

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("reasoner does not know query id: {0}")]
    WrongId(String),

    #[error("no solution for query: {0}")]
    NoSolution(String),

    #[error("failed to parse solution: {source}\n  solution: {solution}")]
    Parse {
        solution: String,
        #[source]
        source: serde_json::Error,
    },
}
