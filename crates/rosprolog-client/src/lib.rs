//! `rosprolog-client`: blocking Rust driver for the rosprolog query service.
//!
//! KnowRob exposes its Prolog reasoner through three calls: `query` opens a
//! query under a caller-chosen id, `next_solution` pulls one binding set at a
//! time, and `finish` releases the query on the reasoner side. This crate
//! speaks that protocol as JSON over HTTP and hands back typed [`Bindings`].
//!
//! # Architecture
//!
//! ```text
//! query string
//!     │
//!     ▼
//! Reasoner trait     ← once / all_solutions / ensure_* helpers
//!     │
//!     ├── HttpPrologClient  ← POST {base}/query, /next_solution, /finish
//!     └── MockReasoner      ← in-memory scripted answers for tests
//!     │
//!     ▼
//! Bindings           ← variable name → JSON value, one map per solution
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rosprolog_client::{atom, HttpPrologClient, Reasoner};
//!
//! let client = HttpPrologClient::new("http://localhost:62226/rosprolog")?;
//! let solution = client.ensure_once(&format!("is_action({})", atom("Action")))?;
//! println!("{:?}", solution.get_str("Action"));
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod reasoner;
pub mod term;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::HttpPrologClient;
pub use error::PrologError;
pub use mock::MockReasoner;
pub use reasoner::Reasoner;
pub use term::atom;
pub use types::{Bindings, QueryMode, SolutionStatus};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, PrologError>;
