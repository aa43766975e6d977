use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::{Bindings, PrologError, Reasoner, Result};

/// Scripted in-process reasoner for tests and offline runs.
///
/// Answers are chosen in this order:
/// 1. the next queued answer pushed with [`push`](Self::push);
/// 2. the first rule (registered with [`on`](Self::on) or
///    [`error_on`](Self::error_on)) whose needle occurs in the query text;
/// 3. a single empty solution, i.e. the query "succeeds".
///
/// Every query is recorded twice: once when it arrives and once when its
/// answer is produced, so tests can check both dispatch and completion order.
#[derive(Debug, Default)]
pub struct MockReasoner {
    rules: Mutex<Vec<(String, Answer)>>,
    queued: Mutex<VecDeque<Answer>>,
    received: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum Answer {
    Solutions(Vec<Bindings>),
    Error(String),
}

impl MockReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` before answering each query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer queries containing `needle` with `solutions`. An empty vector
    /// makes the query fail.
    pub fn on(self, needle: impl Into<String>, solutions: Vec<Bindings>) -> Self {
        lock(&self.rules).push((needle.into(), Answer::Solutions(solutions)));
        self
    }

    /// Make queries containing `needle` fail with a reasoner error.
    pub fn error_on(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        lock(&self.rules).push((needle.into(), Answer::Error(message.into())));
        self
    }

    /// Queue `solutions` as the answer to the next query, whatever it is.
    pub fn push(&self, solutions: Vec<Bindings>) {
        lock(&self.queued).push_back(Answer::Solutions(solutions));
    }

    /// Queries in the order they reached the reasoner.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.received).clone()
    }

    /// Queries in the order their answers were produced.
    pub fn completed(&self) -> Vec<String> {
        lock(&self.completed).clone()
    }

    /// Queries that contain `needle`, in arrival order.
    pub fn queries_containing(&self, needle: &str) -> Vec<String> {
        lock(&self.received)
            .iter()
            .filter(|q| q.contains(needle))
            .cloned()
            .collect()
    }

    fn answer(&self, query: &str) -> Result<Vec<Bindings>> {
        lock(&self.received).push(query.to_owned());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let queued = lock(&self.queued).pop_front();
        let answer = queued.or_else(|| {
            lock(&self.rules)
                .iter()
                .find(|(needle, _)| query.contains(needle.as_str()))
                .map(|(_, answer)| answer.clone())
        });

        lock(&self.completed).push(query.to_owned());
        match answer {
            Some(Answer::Solutions(solutions)) => Ok(solutions),
            Some(Answer::Error(message)) => Err(PrologError::QueryFailed(message)),
            None => Ok(vec![Bindings::new()]),
        }
    }
}

impl Reasoner for MockReasoner {
    fn once(&self, query: &str) -> Result<Option<Bindings>> {
        Ok(self.answer(query)?.into_iter().next())
    }

    fn all_solutions(&self, query: &str) -> Result<Vec<Bindings>> {
        self.answer(query)
    }
}

/// A poisoned lock only means another test thread panicked; the recorded data
/// is still usable.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
