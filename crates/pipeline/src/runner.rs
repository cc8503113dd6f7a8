//! Single stage invocation: request, bounded wait, validation, commit.

use std::time::Duration;

use genai_client::{GenerationClient, GenerationError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::output::StageOutput;
use crate::state::PipelineState;
use crate::traits::Stage;

pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Bounds applied to every stage invocation of a run.
#[derive(Debug, Clone)]
pub struct StageLimits {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl StageLimits {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }
}

impl Default for StageLimits {
    fn default() -> Self {
        Self::new(DEFAULT_STAGE_TIMEOUT, CancellationToken::new())
    }
}

/// Run one stage against `state`.
///
/// ## Algorithm
/// 1. Build the request (fails if an upstream field is missing)
/// 2. Send it, racing the timeout and the cancellation token
/// 3. Reject blank answers
/// 4. Commit the output into the stage's field
///
/// Nothing is written to `state` unless every step succeeds.
///
/// # Returns
/// * `Ok(StageOutput)` - The committed output, for observers
/// * `Err` - Fatal to the run; there is no retry
pub async fn run_stage(
    stage: &dyn Stage,
    client: &dyn GenerationClient,
    state: &mut PipelineState,
    limits: &StageLimits,
) -> Result<StageOutput> {
    let request = stage.build_request(state)?;

    if limits.cancel.is_cancelled() {
        return Err(PipelineError::Cancelled {
            stage: stage.name().to_string(),
        });
    }

    debug!(
        "Invoking {} ({} chars, model: {})",
        stage.name(),
        request.prompt.len(),
        client.model()
    );

    let generation = tokio::select! {
        biased;
        _ = limits.cancel.cancelled() => {
            warn!("{} cancelled while waiting for the generation client", stage.name());
            return Err(PipelineError::Cancelled {
                stage: stage.name().to_string(),
            });
        }
        result = tokio::time::timeout(limits.timeout, client.generate(&request)) => match result {
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: stage.name().to_string(),
                    after: limits.timeout,
                });
            }
            // The HTTP layer can hit its own deadline first; same outcome.
            Ok(Err(GenerationError::Timeout(reason))) => {
                warn!("{} timed out in the generation client: {}", stage.name(), reason);
                return Err(PipelineError::Timeout {
                    stage: stage.name().to_string(),
                    after: limits.timeout,
                });
            }
            Ok(Err(source)) => {
                return Err(PipelineError::Generation {
                    stage: stage.name().to_string(),
                    source,
                });
            }
            Ok(Ok(generation)) => generation,
        },
    };

    let output = StageOutput::from(generation);
    if !output.valid {
        warn!("{} returned an empty response", stage.name());
        return Err(PipelineError::EmptyOutput {
            stage: stage.name().to_string(),
        });
    }

    stage.commit(&output, state)?;
    debug!(
        "{} committed {} chars ({} sources)",
        stage.name(),
        output.text.len(),
        output.sources.len()
    );
    Ok(output)
}
