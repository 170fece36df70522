//! `sheetfuse-merge` — key-column record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded record batches, returns one merged
//! batch. No CLI or IO dependencies.

pub mod error;
pub mod model;
pub mod plan;
pub mod reconcile;

pub use error::MergeError;
pub use model::{Batch, MergeOutcome, MergeSummary, Table, Value};
pub use plan::MergePlan;
pub use reconcile::reconcile;
