//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `RunPhase`: where the orchestrator is in its `Init → PagingLoop → Done` lifecycle
//! - `RunOutcome`: why the paging loop stopped

mod run_state;

// Re-export main types
pub use run_state::{RunOutcome, RunPhase};
