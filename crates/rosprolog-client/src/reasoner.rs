use crate::{Bindings, PrologError, Result};

/// A synchronous handle on an external Prolog reasoner.
///
/// Implementations own their transport; callers only ever see query strings
/// going in and [`Bindings`] coming out. The handle is shared across worker
/// threads, hence the `Send + Sync` bound.
pub trait Reasoner: Send + Sync {
    /// Run `query` and return its first solution, or `None` if it has none.
    fn once(&self, query: &str) -> Result<Option<Bindings>>;

    /// Run `query` and return every solution in reasoner order.
    fn all_solutions(&self, query: &str) -> Result<Vec<Bindings>>;

    /// Like [`once`](Self::once), but a query without solutions is an error.
    fn ensure_once(&self, query: &str) -> Result<Bindings> {
        self.once(query)?
            .ok_or_else(|| PrologError::NoSolution(query.trim().to_owned()))
    }

    /// Like [`all_solutions`](Self::all_solutions), but an empty result is an
    /// error.
    fn ensure_all_solutions(&self, query: &str) -> Result<Vec<Bindings>> {
        let solutions = self.all_solutions(query)?;
        if solutions.is_empty() {
            return Err(PrologError::NoSolution(query.trim().to_owned()));
        }
        Ok(solutions)
    }
}

impl<R: Reasoner + ?Sized> Reasoner for std::sync::Arc<R> {
    fn once(&self, query: &str) -> Result<Option<Bindings>> {
        (**self).once(query)
    }

    fn all_solutions(&self, query: &str) -> Result<Vec<Bindings>> {
        (**self).all_solutions(query)
    }
}
