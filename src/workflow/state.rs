//! Workflow state and phase definitions.

use crate::models::AnalysisOutcome;
use std::fmt;

/// The phase of the interaction, independent of attached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No result, nothing in flight.
    Idle,
    /// An analysis request is in flight.
    Analyzing,
    /// A result is available and no answer has been submitted.
    Ready,
    /// An answer was submitted; waiting for the next result to arrive.
    AnsweredPending,
    /// The last analysis attempt errored.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Analyzing => write!(f, "analyzing"),
            Phase::Ready => write!(f, "ready"),
            Phase::AnsweredPending => write!(f, "answered-pending"),
            Phase::Failed => write!(f, "failed"),
        }
    }
}

/// The client-held workflow state.
///
/// Created fresh as `Idle` at session start. Transitions are driven only
/// by user actions (submit URL, select option, submit answer) and by the
/// analysis call completing. A new URL submission overwrites any prior
/// `Ready`/`Failed` state; there is no separate reset action.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowState {
    /// Start state.
    #[default]
    Idle,
    /// Request in flight for the given URL.
    Analyzing {
        /// URL being analyzed.
        url: String,
    },
    /// Result available, answer not yet submitted.
    Ready {
        /// The analysis result and its provenance.
        outcome: AnalysisOutcome,
        /// Currently chosen option; mutable until submit.
        selected: Option<String>,
    },
    /// Answer submitted; cleared only by the next arriving result.
    AnsweredPending {
        /// The analysis result the answer belongs to.
        outcome: AnalysisOutcome,
        /// The option that was submitted.
        answer: String,
    },
    /// Last analysis attempt errored.
    Failed {
        /// User-visible failure description.
        message: String,
    },
}

impl WorkflowState {
    /// The phase this state is in.
    pub fn phase(&self) -> Phase {
        match self {
            WorkflowState::Idle => Phase::Idle,
            WorkflowState::Analyzing { .. } => Phase::Analyzing,
            WorkflowState::Ready { .. } => Phase::Ready,
            WorkflowState::AnsweredPending { .. } => Phase::AnsweredPending,
            WorkflowState::Failed { .. } => Phase::Failed,
        }
    }

    /// Whether an analysis request is currently in flight.
    #[allow(dead_code)] // Utility for presentation layers
    pub fn is_analyzing(&self) -> bool {
        matches!(self, WorkflowState::Analyzing { .. })
    }

    /// The current analysis outcome, if one is held.
    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            WorkflowState::Ready { outcome, .. }
            | WorkflowState::AnsweredPending { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// The failure message, if the last attempt errored.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            WorkflowState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(WorkflowState::default(), WorkflowState::Idle);
        assert_eq!(WorkflowState::default().phase(), Phase::Idle);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Idle.to_string(), "idle");
        assert_eq!(Phase::Analyzing.to_string(), "analyzing");
        assert_eq!(Phase::Ready.to_string(), "ready");
        assert_eq!(Phase::AnsweredPending.to_string(), "answered-pending");
        assert_eq!(Phase::Failed.to_string(), "failed");
    }

    #[test]
    fn test_accessors() {
        let state = WorkflowState::Analyzing {
            url: "https://example.com".to_string(),
        };
        assert!(state.is_analyzing());
        assert!(state.outcome().is_none());
        assert!(state.failure_message().is_none());

        let state = WorkflowState::Failed {
            message: "boom".to_string(),
        };
        assert_eq!(state.failure_message(), Some("boom"));
    }
}
