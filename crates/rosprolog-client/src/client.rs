use std::time::Duration;

use uuid::Uuid;

use crate::types::{
    IdRequest, NextSolutionResponse, QueryRequest, QueryResponse, SolutionStatus,
};
use crate::{Bindings, PrologError, QueryMode, Reasoner, Result};

// ─── HttpPrologClient ─────────────────────────────────────────────────────

/// Blocking client for a rosprolog service reachable over HTTP.
///
/// Each call opens a fresh query under a unique id, pulls solutions with
/// `next_solution` until the reasoner reports there are none left (or the
/// caller has enough), and always closes the query with `finish`.
///
/// The client holds no per-query state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct HttpPrologClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl HttpPrologClient {
    /// Connect to the service at `base_url` with no request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Connect to the service at `base_url`. `timeout` bounds each HTTP round
    /// trip; `None` waits indefinitely.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, call: &str) -> String {
        format!("{}/{call}", self.base_url)
    }

    /// Open `query` under `id` on the reasoner.
    fn open(&self, id: &str, query: &str, mode: QueryMode) -> Result<()> {
        let body = QueryRequest {
            id,
            query,
            mode: mode.code(),
        };
        let resp: QueryResponse = self
            .http
            .post(self.endpoint("query"))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        if !resp.ok {
            return Err(PrologError::Rejected {
                query: query.to_owned(),
                message: resp.message,
            });
        }
        Ok(())
    }

    /// Pull the next solution for `id`. `Ok(None)` means the query is
    /// exhausted.
    fn next_solution(&self, id: &str) -> Result<Option<Bindings>> {
        let resp: NextSolutionResponse = self
            .http
            .post(self.endpoint("next_solution"))
            .json(&IdRequest { id })
            .send()?
            .error_for_status()?
            .json()?;

        match SolutionStatus::from_code(resp.status) {
            Some(SolutionStatus::Ok) => resp.bindings().map(Some),
            Some(SolutionStatus::NoSolution) => Ok(None),
            Some(SolutionStatus::WrongId) => Err(PrologError::WrongId(id.to_owned())),
            Some(SolutionStatus::QueryFailed) => Err(PrologError::QueryFailed(resp.solution)),
            None => Err(PrologError::QueryFailed(format!(
                "unknown next_solution status {}",
                resp.status
            ))),
        }
    }

    /// Release `id` on the reasoner. Failures are logged, never returned:
    /// the caller already has its answer (or its error).
    fn finish(&self, id: &str) {
        let result = self
            .http
            .post(self.endpoint("finish"))
            .json(&IdRequest { id })
            .send()
            .and_then(|r| r.error_for_status());
        if let Err(e) = result {
            tracing::warn!(query_id = id, error = %e, "failed to finish prolog query");
        }
    }

    /// Open, drain up to `limit` solutions, and finish a query.
    fn run(&self, query: &str, mode: QueryMode, limit: Option<usize>) -> Result<Vec<Bindings>> {
        let id = format!("RUST_QUERY_{}", Uuid::new_v4().simple());
        tracing::debug!(query_id = %id, mode = mode.as_str(), query = query.trim(), "prolog query");

        let result = self.open(&id, query, mode).and_then(|()| {
            let mut solutions = Vec::new();
            while limit.map_or(true, |n| solutions.len() < n) {
                match self.next_solution(&id)? {
                    Some(bindings) => solutions.push(bindings),
                    None => break,
                }
            }
            Ok(solutions)
        });

        self.finish(&id);
        result
    }
}

impl Reasoner for HttpPrologClient {
    fn once(&self, query: &str) -> Result<Option<Bindings>> {
        Ok(self
            .run(query, QueryMode::Incremental, Some(1))?
            .into_iter()
            .next())
    }

    fn all_solutions(&self, query: &str) -> Result<Vec<Bindings>> {
        self.run(query, QueryMode::All, None)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
