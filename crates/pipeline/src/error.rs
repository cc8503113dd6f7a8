//! Error types for the pipeline crate.

use std::time::Duration;

use genai_client::GenerationError;
use thiserror::Error;

/// Errors raised while building, running or committing a stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run was started with a blank query
    #[error("Query must not be empty")]
    EmptyQuery,

    /// A stage read a field no upstream stage has written yet
    #[error("`{field}` was read before any stage wrote it")]
    MissingField { field: &'static str },

    /// A stage tried to overwrite a field
    #[error("`{field}` is already set for this run")]
    FieldAlreadySet { field: &'static str },

    /// The generation client failed; fatal to the run
    #[error("{stage} failed: {source}")]
    Generation {
        stage: String,
        #[source]
        source: GenerationError,
    },

    /// The generation client answered with blank text
    #[error("{stage} returned an empty response")]
    EmptyOutput { stage: String },

    #[error("{stage} timed out after {after:?}")]
    Timeout { stage: String, after: Duration },

    #[error("{stage} was cancelled")]
    Cancelled { stage: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
