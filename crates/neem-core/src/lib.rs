//! `neem-core`: building and reading NEEMs (Narrative-Enabled Episodic
//! Memories) in a KnowRob knowledge base.
//!
//! Nothing here reasons on its own. Each operation renders a Prolog goal from
//! [`query`] and ships it through a [`rosprolog_client::Reasoner`] handle that
//! the caller constructs and passes in.
//!
//! # Layout
//!
//! ```text
//! NeemInterface   ← episodes, sub-actions, poses, states, lookups (neem.rs, vr.rs)
//!   ├── WorkerPool      ← trajectory fan-out, last pose awaited
//!   └── Episode         ← start/stop scope guard
//! NeemData        ← canned queries by name + VR session ops, JSON out
//! BootstrapInterface ← instruction → task/role/goal facts
//! payload         ← participant lists, additional-info normalization
//! ```

pub mod bootstrap;
pub mod config;
pub mod data;
pub mod episode;
pub mod error;
pub mod neem;
pub mod payload;
pub mod pool;
pub mod pose;
pub mod query;
pub mod vr;

pub use bootstrap::BootstrapInterface;
pub use config::Config;
pub use data::{DataQuery, NeemData};
pub use episode::Episode;
pub use error::{NeemError, Result};
pub use neem::{EpisodeContext, NeemInterface};
pub use pose::{Datapoint, Pose};
pub use vr::VrSubAction;
