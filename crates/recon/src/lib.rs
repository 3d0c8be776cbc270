//! License registry reconciliation engine.
//!
//! Compares a state facility registry against an internal provider registry
//! and classifies the differences into five actionable tables: license
//! updates, new licenses, expired licenses, and bed-count changes (updates
//! and additions).
//!
//! Pure engine crate: receives pre-loaded tables and an injected run instant,
//! returns classified results. No CLI or IO dependencies. [`run`] never
//! fails; input problems degrade to empty tables with diagnostics.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{run, try_run};
pub use error::ReconError;
pub use model::{MatchCategory, ReconInput, ReconResult, ResultTables, Table};
