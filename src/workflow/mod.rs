//! Workflow state machine modules.
//!
//! This module owns the client-side analysis workflow: the state the
//! user currently sees and the controller that sequences URL analysis
//! and answer submission.

pub mod controller;
pub mod state;

pub use controller::{AnalysisBackend, WorkflowController};
pub use state::{Phase, WorkflowState};
