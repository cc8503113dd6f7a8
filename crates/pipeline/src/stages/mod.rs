//! Stage implementations for the recommendation grid.
//!
//! This module contains the four concrete stages, in the order the
//! StagePipeline runs them.

pub mod profiler;
pub mod researcher;
pub mod curator;
pub mod critic;

// Re-export for convenience
pub use critic::CriticStage;
pub use curator::{CuratorStage, SHORTLIST_SIZE};
pub use profiler::ProfilerStage;
pub use researcher::{CANDIDATE_COUNT, ResearcherStage};
