//! Stages of the recommendation grid.
//!
//! This crate provides:
//! - PipelineState, the write-once record passed between stages
//! - The Stage trait and the four stage implementations
//! - StagePipeline for composing stages
//! - The approval gate (VerdictClassifier) used by the critic
//! - run_stage, which invokes one stage under a timeout and cancellation
//!
//! ## Architecture
//! A run moves through the stages in a fixed order:
//! 1. Profiler turns the query into an intent profile
//! 2. Researcher lists rated candidates for the profile
//! 3. Curator cuts them to a shortlist with rationales (the draft)
//! 4. Critic reviews the draft against the profile; the gate decides approval
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{PipelineState, StageLimits, StagePipeline, run_stage};
//!
//! let pipeline = StagePipeline::default();
//! let mut state = PipelineState::new("dark 90s sci-fi movies like Blade Runner")?;
//! let limits = StageLimits::default();
//!
//! for stage in pipeline.stages() {
//!     run_stage(stage, client.as_ref(), &mut state, &limits).await?;
//! }
//! println!("approved: {}", state.approved());
//! ```

pub mod error;
pub mod gate;
pub mod output;
pub mod phase;
pub mod recommendation;
pub mod runner;
pub mod stage_pipeline;
pub mod stages;
pub mod state;
pub mod traits;

// Re-export main types
pub use error::{PipelineError, Result};
pub use gate::{GatePolicy, StrictClassifier, SubstringClassifier, Verdict, VerdictClassifier};
pub use output::StageOutput;
pub use phase::Phase;
pub use recommendation::{MediaKind, Recommendation, parse_recommendations};
pub use runner::{DEFAULT_STAGE_TIMEOUT, StageLimits, run_stage};
pub use stage_pipeline::{PipelineOptions, StagePipeline};
pub use state::PipelineState;
pub use traits::Stage;
