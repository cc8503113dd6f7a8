//! Core trait for pipeline stages.
//!
//! A stage is split into two pure halves around the network call: building
//! the request from upstream state, and committing the answer into its own
//! field. The call itself happens in `runner::run_stage`, so timeouts,
//! cancellation and validation are applied the same way for every stage.

use genai_client::GenerationRequest;

use crate::error::Result;
use crate::output::StageOutput;
use crate::phase::Phase;
use crate::state::PipelineState;

/// All stages must implement this trait to be used in the StagePipeline.
///
/// ## Design Note
/// - `Send + Sync` lets the pipeline sit behind an `Arc` in the orchestrator
/// - `build_request` only reads state, `commit` only writes the stage's own field
pub trait Stage: Send + Sync {
    /// Returns the name of this stage (for logging/debugging)
    fn name(&self) -> &str;

    /// Display name shown to users while the stage runs.
    fn persona(&self) -> &str;

    /// The orchestrator phase this stage runs in.
    fn phase(&self) -> Phase;

    /// Build the prompt from upstream fields.
    ///
    /// # Returns
    /// * `Err(MissingField)` - If an upstream field has not been written
    fn build_request(&self, state: &PipelineState) -> Result<GenerationRequest>;

    /// Write a validated output into this stage's field(s).
    fn commit(&self, output: &StageOutput, state: &mut PipelineState) -> Result<()>;
}
