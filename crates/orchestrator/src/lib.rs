//! Orchestrator crate for the naiwatches recommendation grid.
//!
//! This crate sequences the pipeline stages through an explicit state
//! machine, applies the approval gate and reports progress to an observer.

pub mod error;
pub mod observer;
pub mod orchestrator;
pub mod outcome;

pub use error::RunError;
pub use observer::{ProgressObserver, SilentObserver, TracingObserver};
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use outcome::{RunOutcome, RunReport};
