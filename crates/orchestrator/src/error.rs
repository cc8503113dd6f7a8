//! Run-level errors.

use pipeline::{Phase, PipelineError, PipelineState};
use thiserror::Error;

/// Why a run stopped without reaching the gate.
///
/// A rejected draft is not an error; it comes back as
/// `RunOutcome::Rejected`.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[source] PipelineError),

    /// A stage failed; `state` holds whatever earlier stages wrote.
    #[error("Run aborted during {phase}: {source}")]
    Stage {
        phase: Phase,
        #[source]
        source: PipelineError,
        state: Box<PipelineState>,
    },

    /// The stage list asked for a phase out of order; `state` is as above.
    #[error("Illegal phase transition {from} -> {to}")]
    IllegalTransition {
        from: Phase,
        to: Phase,
        state: Box<PipelineState>,
    },
}

impl RunError {
    /// State captured at the point of failure, if the run got that far.
    pub fn partial_state(&self) -> Option<&PipelineState> {
        match self {
            RunError::Stage { state, .. } | RunError::IllegalTransition { state, .. } => {
                Some(state.as_ref())
            }
            RunError::InvalidQuery(_) => None,
        }
    }
}
