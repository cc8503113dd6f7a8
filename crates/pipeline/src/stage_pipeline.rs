//! The StagePipeline holds the ordered stages of a run.
//!
//! This module provides the StagePipeline struct that collects stages
//! using the builder pattern, plus `PipelineOptions` for the standard
//! four-stage layout.

use crate::gate::GatePolicy;
use crate::stages::{CriticStage, CuratorStage, ProfilerStage, ResearcherStage};
use crate::traits::Stage;

/// Switches that shape the standard pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub gate: GatePolicy,
    /// Ask the curator for JSON recommendations instead of prose.
    pub structured_draft: bool,
    /// Ground the researcher in web search.
    pub grounded_research: bool,
}

/// Ordered list of stages.
///
/// ## Usage
/// ```ignore
/// let pipeline = StagePipeline::new()
///     .add_stage(ProfilerStage)
///     .add_stage(ResearcherStage::default())
///     .add_stage(CuratorStage::default())
///     .add_stage(CriticStage::default());
/// ```
///
/// The pipeline does not police order itself; the orchestrator checks each
/// stage's phase against its state machine before running it.
pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl StagePipeline {
    /// Create a new empty StagePipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Profiler, Researcher, Curator, Critic.
    pub fn standard(options: PipelineOptions) -> Self {
        Self::new()
            .add_stage(ProfilerStage)
            .add_stage(ResearcherStage::new(options.grounded_research))
            .add_stage(CuratorStage::new(options.structured_draft))
            .add_stage(CriticStage::with_policy(options.gate))
    }

    /// Add a stage to the pipeline (builder pattern).
    pub fn add_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stages(&self) -> impl Iterator<Item = &dyn Stage> + '_ {
        self.stages.iter().map(|stage| stage.as_ref())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self::standard(PipelineOptions::default())
    }
}
