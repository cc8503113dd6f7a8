//! Profiler: turns the raw query into an intent profile.

use genai_client::GenerationRequest;

use crate::error::Result;
use crate::output::StageOutput;
use crate::phase::Phase;
use crate::state::PipelineState;
use crate::traits::Stage;

/// Reads `query`, writes `profile`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfilerStage;

impl Stage for ProfilerStage {
    fn name(&self) -> &str {
        "Profiler"
    }

    fn persona(&self) -> &str {
        "Vibe Analyzer"
    }

    fn phase(&self) -> Phase {
        Phase::Profiling
    }

    fn build_request(&self, state: &PipelineState) -> Result<GenerationRequest> {
        Ok(GenerationRequest::new(format!(
            "Analyze this request and extract a movie-lover profile \
             (genres, era, mood, themes, and any favourite titles it mentions): '{}'. \
             Output a concise profile.",
            state.query()
        )))
    }

    fn commit(&self, output: &StageOutput, state: &mut PipelineState) -> Result<()> {
        state.set_profile(output.text.clone())
    }
}
