//! Progress reporting side channel.
//!
//! Observers see every phase change and stage boundary of a run. They are
//! not part of the data contract: a run behaves identically with any
//! observer attached.

use pipeline::{Phase, Stage, StageOutput};
use tracing::{info, warn};

use crate::error::RunError;
use crate::outcome::RunReport;

/// Sink for human-readable progress events. Every method defaults to a no-op.
pub trait ProgressObserver: Send + Sync {
    fn run_started(&self, _query: &str) {}

    fn phase_changed(&self, _from: Phase, _to: Phase) {}

    fn stage_started(&self, _stage: &dyn Stage) {}

    fn stage_finished(&self, _stage: &dyn Stage, _output: &StageOutput) {}

    fn run_finished(&self, _report: &RunReport) {}

    fn run_aborted(&self, _error: &RunError) {}
}

/// Emits structured tracing events; the default observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn run_started(&self, query: &str) {
        info!(query, "Grid run started");
    }

    fn stage_started(&self, stage: &dyn Stage) {
        info!(stage = stage.name(), persona = stage.persona(), "Stage started");
    }

    fn stage_finished(&self, stage: &dyn Stage, output: &StageOutput) {
        info!(
            stage = stage.name(),
            chars = output.text.len(),
            sources = output.sources.len(),
            "Stage finished"
        );
    }

    fn run_finished(&self, report: &RunReport) {
        info!(
            approved = report.outcome.is_approved(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Grid run finished"
        );
    }

    fn run_aborted(&self, error: &RunError) {
        warn!(%error, "Grid run aborted");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl ProgressObserver for SilentObserver {}
