//! Curator: cuts the research down to a shortlist with rationales.

use genai_client::GenerationRequest;

use crate::error::Result;
use crate::output::StageOutput;
use crate::phase::Phase;
use crate::recommendation::recommendation_schema;
use crate::state::PipelineState;
use crate::traits::Stage;

/// Size of the shortlist handed to the critic.
pub const SHORTLIST_SIZE: usize = 3;

/// Reads `research`, writes `draft`.
///
/// In structured mode the draft is a JSON array of recommendations; in
/// either mode it is stored exactly as returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct CuratorStage {
    structured: bool,
}

impl CuratorStage {
    pub fn new(structured: bool) -> Self {
        Self { structured }
    }
}

impl Stage for CuratorStage {
    fn name(&self) -> &str {
        "Curator"
    }

    fn persona(&self) -> &str {
        "Mix Master"
    }

    fn phase(&self) -> Phase {
        Phase::Curating
    }

    fn build_request(&self, state: &PipelineState) -> Result<GenerationRequest> {
        let research = state.research()?;

        if self.structured {
            Ok(GenerationRequest::new(format!(
                "Based on this research: {}, pick the top {} best matches. \
                 For each give title, year, rating, type (movie or series) and a \
                 1-sentence 'Hype Rationale'.",
                research, SHORTLIST_SIZE
            ))
            .with_schema(recommendation_schema()))
        } else {
            Ok(GenerationRequest::new(format!(
                "Based on this research: {}, pick the top {} best matches. \
                 Write a 1-sentence 'Hype Rationale' for each.",
                research, SHORTLIST_SIZE
            )))
        }
    }

    fn commit(&self, output: &StageOutput, state: &mut PipelineState) -> Result<()> {
        state.set_draft(output.text.clone())
    }
}
