//! Researcher: enumerates rated candidates for the profile.
//!
//! With grounding on, the generation service backs the answer with web
//! search and the source URIs are appended to the research text so the
//! curator can see where the ratings came from.

use genai_client::GenerationRequest;

use crate::error::Result;
use crate::output::StageOutput;
use crate::phase::Phase;
use crate::state::PipelineState;
use crate::traits::Stage;

/// How many candidates the researcher asks for.
pub const CANDIDATE_COUNT: usize = 5;

/// Reads `profile`, writes `research`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResearcherStage {
    grounded: bool,
}

impl ResearcherStage {
    pub fn new(grounded: bool) -> Self {
        Self { grounded }
    }
}

impl Stage for ResearcherStage {
    fn name(&self) -> &str {
        "Researcher"
    }

    fn persona(&self) -> &str {
        "Web Scout"
    }

    fn phase(&self) -> Phase {
        Phase::Researching
    }

    fn build_request(&self, state: &PipelineState) -> Result<GenerationRequest> {
        let profile = state.profile()?;

        if self.grounded {
            Ok(GenerationRequest::new(format!(
                "Search the web for {} critically acclaimed movies or series matching this profile: {}. \
                 Use current IMDb and Rotten Tomatoes ratings. List titles and ratings.",
                CANDIDATE_COUNT, profile
            ))
            .grounded())
        } else {
            Ok(GenerationRequest::new(format!(
                "Search simulation: Find {} critically acclaimed titles matching this profile: {}. \
                 List titles and ratings.",
                CANDIDATE_COUNT, profile
            )))
        }
    }

    fn commit(&self, output: &StageOutput, state: &mut PipelineState) -> Result<()> {
        let research = if output.sources.is_empty() {
            output.text.clone()
        } else {
            format!("{}\n\nSources: {}", output.text, output.sources.join(", "))
        };
        state.set_research(research)
    }
}
