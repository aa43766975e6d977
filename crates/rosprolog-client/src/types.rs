use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Bindings ─────────────────────────────────────────────────────────────

/// One solution of a Prolog query: each bound variable name mapped to its
/// value as decoded from the reasoner's JSON encoding.
///
/// A query without free variables that succeeds yields an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(Map<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful when scripting mock answers.
    pub fn with(mut self, var: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(var.into(), value.into());
        self
    }

    pub fn insert(&mut self, var: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(var.into(), value.into());
    }

    pub fn get(&self, var: &str) -> Option<&Value> {
        self.0.get(var)
    }

    /// Returns the binding of `var` if it is an atom/string.
    pub fn get_str(&self, var: &str) -> Option<&str> {
        self.0.get(var).and_then(Value::as_str)
    }

    /// Returns the binding of `var` as a float. Integers are widened.
    pub fn get_f64(&self, var: &str) -> Option<f64> {
        self.0.get(var).and_then(Value::as_f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Bindings {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ─── Query mode ───────────────────────────────────────────────────────────

/// How the reasoner should compute solutions for an opened query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// All solutions are computed when the query is opened.
    All,
    /// Solutions are computed one at a time as they are requested.
    Incremental,
}

impl QueryMode {
    pub fn code(self) -> u8 {
        match self {
            QueryMode::All => 0,
            QueryMode::Incremental => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryMode::All => "all",
            QueryMode::Incremental => "incremental",
        }
    }
}

// ─── Solution status ──────────────────────────────────────────────────────

/// Status code returned by the `next_solution` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    NoSolution,
    WrongId,
    QueryFailed,
    Ok,
}

impl SolutionStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SolutionStatus::NoSolution),
            1 => Some(SolutionStatus::WrongId),
            2 => Some(SolutionStatus::QueryFailed),
            3 => Some(SolutionStatus::Ok),
            _ => None,
        }
    }
}

// ─── Wire messages ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub id: &'a str,
    pub query: &'a str,
    pub mode: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryResponse {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdRequest<'a> {
    pub id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NextSolutionResponse {
    pub status: i64,
    /// JSON-encoded binding object; carries the error text when the status
    /// reports a failed query.
    #[serde(default)]
    pub solution: String,
}

impl NextSolutionResponse {
    /// Decode the embedded solution text into [`Bindings`].
    pub(crate) fn bindings(&self) -> crate::Result<Bindings> {
        let text = self.solution.trim();
        if text.is_empty() {
            return Ok(Bindings::default());
        }
        serde_json::from_str(text).map_err(|source| crate::PrologError::Parse {
            solution: text.to_owned(),
            source,
        })
    }
}
