//! Critic: reviews the draft against the profile and feeds the gate.

use genai_client::GenerationRequest;
use tracing::debug;

use crate::error::Result;
use crate::gate::{GatePolicy, VerdictClassifier};
use crate::output::StageOutput;
use crate::phase::Phase;
use crate::state::PipelineState;
use crate::traits::Stage;

/// Reads `draft` and `profile`, writes `critique` and the gate flag.
pub struct CriticStage {
    classifier: Box<dyn VerdictClassifier>,
}

impl CriticStage {
    /// Create a critic that decides with `classifier`.
    pub fn new(classifier: Box<dyn VerdictClassifier>) -> Self {
        Self { classifier }
    }

    pub fn with_policy(policy: GatePolicy) -> Self {
        Self::new(policy.classifier())
    }
}

impl Default for CriticStage {
    fn default() -> Self {
        Self::with_policy(GatePolicy::default())
    }
}

impl Stage for CriticStage {
    fn name(&self) -> &str {
        "Critic"
    }

    fn persona(&self) -> &str {
        "Hype Checker"
    }

    fn phase(&self) -> Phase {
        Phase::Critiquing
    }

    fn build_request(&self, state: &PipelineState) -> Result<GenerationRequest> {
        let draft = state.draft()?;
        let profile = state.profile()?;

        Ok(GenerationRequest::new(format!(
            "Review this draft: {} against the user profile: {}. \
             Is this a perfect match? Answer 'YES' or 'NO' first, followed by reasoning.",
            draft, profile
        )))
    }

    fn commit(&self, output: &StageOutput, state: &mut PipelineState) -> Result<()> {
        let verdict = self.classifier.classify(&output.text);
        debug!("{} classified critique as {}", self.classifier.name(), verdict);
        state.record_critique(output.text.clone(), verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::gate::Verdict;

    fn drafted_state() -> PipelineState {
        let mut state = PipelineState::new("q").unwrap();
        state.set_profile("cyberpunk, 1990s".to_string()).unwrap();
        state.set_research("r".to_string()).unwrap();
        state.set_draft("1. Ghost in the Shell".to_string()).unwrap();
        state
    }

    fn critique(text: &str, stage: &CriticStage) -> PipelineState {
        let mut state = drafted_state();
        stage.commit(&StageOutput::new(text), &mut state).unwrap();
        state
    }

    #[test]
    fn test_prompt_includes_draft_and_profile() {
        let request = CriticStage::default()
            .build_request(&drafted_state())
            .unwrap();

        assert!(request.prompt.contains("Review this draft: 1. Ghost in the Shell"));
        assert!(request.prompt.contains("against the user profile: cyberpunk, 1990s"));
        assert!(request.prompt.contains("'YES' or 'NO'"));
    }

    #[test]
    fn test_requires_draft() {
        let mut state = PipelineState::new("q").unwrap();
        state.set_profile("p".to_string()).unwrap();

        assert!(matches!(
            CriticStage::default().build_request(&state),
            Err(PipelineError::MissingField { field: "draft" })
        ));
    }

    #[test]
    fn test_default_gate_decisions() {
        let stage = CriticStage::default();

        assert!(critique("YES, strong match", &stage).approved());
        assert!(!critique("no, mismatch", &stage).approved());
        assert!(critique("Yesterday's picks were fine", &stage).approved());
    }

    #[test]
    fn test_commit_keeps_critique_text_and_verdict() {
        let state = critique("NO, mismatched tone", &CriticStage::default());

        assert_eq!(state.critique().unwrap(), "NO, mismatched tone");
        assert_eq!(state.verdict(), Some(Verdict::Rejected));
    }

    #[test]
    fn test_strict_policy_marks_ambiguity() {
        let state = critique(
            "Yesterday's picks were fine",
            &CriticStage::with_policy(GatePolicy::Strict),
        );

        assert!(!state.approved());
        assert_eq!(state.verdict(), Some(Verdict::Ambiguous));
    }
}
