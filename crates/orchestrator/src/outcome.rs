//! Terminal outcome of a completed run.

use std::time::Duration;

use pipeline::{PipelineError, PipelineState, Verdict};
use serde::Serialize;

/// Exactly one of these ends every run that reaches the gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Approved { draft: String, critique: String },
    /// `verdict` is `Rejected` or `Ambiguous`.
    Rejected { critique: String, verdict: Verdict },
}

impl RunOutcome {
    /// Read the gate decision off a fully populated state.
    pub fn from_state(state: &PipelineState) -> Result<Self, PipelineError> {
        let critique = state.critique()?.to_string();

        if state.approved() {
            Ok(RunOutcome::Approved {
                draft: state.draft()?.to_string(),
                critique,
            })
        } else {
            Ok(RunOutcome::Rejected {
                critique,
                verdict: state.verdict().unwrap_or(Verdict::Ambiguous),
            })
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, RunOutcome::Approved { .. })
    }

    pub fn critique(&self) -> &str {
        match self {
            RunOutcome::Approved { critique, .. } | RunOutcome::Rejected { critique, .. } => {
                critique.as_str()
            }
        }
    }
}

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub state: PipelineState,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drafted_state() -> PipelineState {
        let mut state = PipelineState::new("q").unwrap();
        state.set_profile("p".to_string()).unwrap();
        state.set_research("r".to_string()).unwrap();
        state.set_draft("the draft".to_string()).unwrap();
        state
    }

    #[test]
    fn test_approved_carries_draft() {
        let mut state = drafted_state();
        state.record_critique("YES".to_string(), Verdict::Approved).unwrap();

        assert_eq!(
            RunOutcome::from_state(&state).unwrap(),
            RunOutcome::Approved {
                draft: "the draft".to_string(),
                critique: "YES".to_string()
            }
        );
    }

    #[test]
    fn test_ambiguous_is_reported_as_rejection() {
        let mut state = drafted_state();
        state.record_critique("hmm".to_string(), Verdict::Ambiguous).unwrap();

        let outcome = RunOutcome::from_state(&state).unwrap();
        assert!(!outcome.is_approved());
        assert_eq!(
            outcome,
            RunOutcome::Rejected {
                critique: "hmm".to_string(),
                verdict: Verdict::Ambiguous
            }
        );
    }

    #[test]
    fn test_without_critique_there_is_no_outcome() {
        assert!(RunOutcome::from_state(&drafted_state()).is_err());
    }
}
