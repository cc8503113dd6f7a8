//! # Grid Orchestrator
//!
//! This module coordinates one recommendation run:
//! 1. Create a fresh PipelineState for the query
//! 2. Profile the query (Vibe Analyzer)
//! 3. Research rated candidates (Web Scout)
//! 4. Curate a shortlist (Mix Master)
//! 5. Critique the shortlist (Hype Checker)
//! 6. Apply the gate and return an Approved or Rejected outcome
//!
//! The run is an explicit state machine:
//! `INIT -> PROFILING -> RESEARCHING -> CURATING -> CRITIQUING -> DONE`,
//! with a single `ABORTED` exit from any working phase. Any stage failure
//! is fatal; there is no retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use genai_client::GenerationClient;
use pipeline::{
    DEFAULT_STAGE_TIMEOUT, GatePolicy, Phase, PipelineOptions, PipelineState, StageLimits,
    StagePipeline, run_stage,
};

use crate::error::RunError;
use crate::observer::{ProgressObserver, TracingObserver};
use crate::outcome::{RunOutcome, RunReport};

/// Per-orchestrator configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Upper bound on each generation call.
    pub stage_timeout: Duration,
    pub gate: GatePolicy,
    pub structured_draft: bool,
    pub grounded_research: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            gate: GatePolicy::default(),
            structured_draft: false,
            grounded_research: false,
        }
    }
}

impl OrchestratorSettings {
    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            gate: self.gate,
            structured_draft: self.structured_draft,
            grounded_research: self.grounded_research,
        }
    }
}

/// Main orchestrator that sequences the grid stages.
///
/// Holds only shared, immutable parts; every `run` builds its own state, so
/// clones can serve independent runs.
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    stages: Arc<StagePipeline>,
    observer: Arc<dyn ProgressObserver>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Create a new orchestrator with the standard four-stage pipeline.
    ///
    /// # Arguments
    /// * `client` - Generation client shared by every stage
    /// * `settings` - Timeout, gate policy and stage switches
    pub fn new(client: Arc<dyn GenerationClient>, settings: OrchestratorSettings) -> Self {
        let stages = Arc::new(StagePipeline::standard(settings.pipeline_options()));
        Self::with_pipeline(client, stages, settings)
    }

    /// Create an orchestrator around a custom stage list.
    ///
    /// The state machine still checks every stage's phase, so a pipeline
    /// that skips or reorders stages aborts with `IllegalTransition`.
    pub fn with_pipeline(
        client: Arc<dyn GenerationClient>,
        stages: Arc<StagePipeline>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            client,
            stages,
            observer: Arc::new(TracingObserver),
            settings,
        }
    }

    /// Replace the progress observer (builder pattern).
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Main entry point: run the grid for one query.
    ///
    /// # Returns
    /// * `Ok(RunReport)` - The run reached the gate; the outcome says which way it went
    /// * `Err(RunError)` - The run aborted before the gate
    pub async fn run(&self, query: &str) -> Result<RunReport, RunError> {
        self.run_with_cancel(query, CancellationToken::new()).await
    }

    /// Like `run`, but every stage also stops when `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<RunReport, RunError> {
        // Start timing
        let start_time = Instant::now();

        let mut state = PipelineState::new(query).map_err(RunError::InvalidQuery)?;
        self.observer.run_started(state.query());
        info!(
            "Starting grid run with model {} for query: {}",
            self.client.model(),
            state.query()
        );

        let limits = StageLimits::new(self.settings.stage_timeout, cancel);
        let mut phase = Phase::Init;

        for stage in self.stages.stages() {
            phase = self.advance(phase, stage.phase(), &state)?;
            self.observer.stage_started(stage);

            let stage_start = Instant::now();
            match run_stage(stage, self.client.as_ref(), &mut state, &limits).await {
                Ok(output) => {
                    info!(
                        "{} finished in {:.2?} ({} chars)",
                        stage.name(),
                        stage_start.elapsed(),
                        output.text.len()
                    );
                    self.observer.stage_finished(stage, &output);
                }
                Err(source) => {
                    error!("{} failed during {}: {}", stage.name(), phase, source);
                    self.advance(phase, Phase::Aborted, &state)?;
                    return Err(self.abort(RunError::Stage {
                        phase,
                        source,
                        state: Box::new(state),
                    }));
                }
            }
        }

        self.advance(phase, Phase::Done, &state)?;

        let outcome = RunOutcome::from_state(&state).map_err(|source| {
            self.abort(RunError::Stage {
                phase: Phase::Done,
                source,
                state: Box::new(state.clone()),
            })
        })?;

        // Log total time
        let elapsed = start_time.elapsed();
        info!(
            "Grid run finished in {:.2?}: {}",
            elapsed,
            if outcome.is_approved() { "approved" } else { "rejected" }
        );

        let report = RunReport {
            outcome,
            state,
            elapsed,
        };
        self.observer.run_finished(&report);
        Ok(report)
    }

    /// Move the state machine from `from` to `to`, or fail if that edge
    /// does not exist.
    fn advance(&self, from: Phase, to: Phase, state: &PipelineState) -> Result<Phase, RunError> {
        if !from.can_transition_to(to) {
            error!("Illegal phase transition {} -> {}", from, to);
            return Err(self.abort(RunError::IllegalTransition {
                from,
                to,
                state: Box::new(state.clone()),
            }));
        }
        debug!("Phase {} -> {}", from, to);
        self.observer.phase_changed(from, to);
        Ok(to)
    }

    fn abort(&self, error: RunError) -> RunError {
        self.observer.run_aborted(&error);
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use genai_client::{Generation, GenerationError, GenerationRequest};
    use pipeline::stages::{CriticStage, CuratorStage, ProfilerStage};
    use pipeline::{PipelineError, Stage, StageOutput, Verdict};
    use std::sync::Mutex;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    const QUERY: &str = "dark 90s sci-fi movies like Blade Runner";
    const PROFILE: &str = "Genres: cyberpunk, neo-noir. Era: 1990s. Mood: bleak.";
    const RESEARCH: &str = "1. Dark City (8.1)\n2. Ghost in the Shell (8.0)\n3. Gattaca (7.8)\n4. Strange Days (7.2)\n5. 12 Monkeys (8.0)";
    const DRAFT: &str = "1. Dark City - memory noir.\n2. Ghost in the Shell - neon philosophy.\n3. Strange Days - millennial dread.";

    /// Scripted client that answers by stage, recognised from the prompt.
    ///
    /// Records which stage each call belonged to, so tests can check the
    /// call order without relying on answer order.
    struct MockGenerationClient {
        critique: String,
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl MockGenerationClient {
        fn new(critique: &str) -> Self {
            Self {
                critique: critique.to_string(),
                fail_on: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing_on(mut self, stage: &'static str) -> Self {
            self.fail_on = Some(stage);
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn stage_of(prompt: &str) -> &'static str {
            if prompt.starts_with("Analyze this request") {
                "profiler"
            } else if prompt.starts_with("Search simulation") {
                "researcher"
            } else if prompt.starts_with("Based on this research") {
                "curator"
            } else if prompt.starts_with("Review this draft") {
                "critic"
            } else {
                "unknown"
            }
        }
    }

    #[async_trait]
    impl GenerationClient for MockGenerationClient {
        fn model(&self) -> &str {
            "mock"
        }

        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<Generation, GenerationError> {
            let stage = Self::stage_of(&request.prompt);
            self.calls.lock().unwrap().push(stage);

            if self.fail_on == Some(stage) {
                return Err(GenerationError::Transport("connection reset by peer".into()));
            }

            let text = match stage {
                "profiler" => PROFILE,
                "researcher" => RESEARCH,
                "curator" => DRAFT,
                "critic" => self.critique.as_str(),
                _ => return Err(GenerationError::InvalidResponse("unexpected prompt".into())),
            };
            Ok(Generation::new(text))
        }
    }

    /// Records every observer callback as a short string.
    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn run_started(&self, _query: &str) {
            self.push("run_started".to_string());
        }

        fn phase_changed(&self, from: Phase, to: Phase) {
            self.push(format!("{}->{}", from, to));
        }

        fn stage_started(&self, stage: &dyn Stage) {
            self.push(format!("start:{}", stage.name()));
        }

        fn stage_finished(&self, stage: &dyn Stage, _output: &StageOutput) {
            self.push(format!("finish:{}", stage.name()));
        }

        fn run_finished(&self, report: &RunReport) {
            self.push(format!("finished:{}", report.outcome.is_approved()));
        }

        fn run_aborted(&self, _error: &RunError) {
            self.push("aborted".to_string());
        }
    }

    fn build_test_orchestrator(
        client: MockGenerationClient,
    ) -> (Orchestrator, Arc<MockGenerationClient>, Arc<RecordingObserver>) {
        let client = Arc::new(client);
        let observer = Arc::new(RecordingObserver::default());
        let orchestrator = Orchestrator::new(client.clone(), OrchestratorSettings::default())
            .with_observer(observer.clone());
        (orchestrator, client, observer)
    }

    // ============================================================================
    // End-to-end scenarios
    // ============================================================================

    #[tokio::test]
    async fn test_approved_run_returns_draft_verbatim() {
        let (orchestrator, _, _) =
            build_test_orchestrator(MockGenerationClient::new("YES, this nails the vibe."));

        let report = orchestrator.run(QUERY).await.expect("run should succeed");

        assert_eq!(
            report.outcome,
            RunOutcome::Approved {
                draft: DRAFT.to_string(),
                critique: "YES, this nails the vibe.".to_string(),
            }
        );
        assert!(report.state.approved());
    }

    #[tokio::test]
    async fn test_rejected_run_returns_critique() {
        let (orchestrator, _, _) =
            build_test_orchestrator(MockGenerationClient::new("NO, mismatched tone"));

        let report = orchestrator.run(QUERY).await.expect("run should succeed");

        assert_eq!(
            report.outcome,
            RunOutcome::Rejected {
                critique: "NO, mismatched tone".to_string(),
                verdict: Verdict::Rejected,
            }
        );
        assert!(!report.state.approved());
    }

    #[tokio::test]
    async fn test_exactly_one_outcome_per_run() {
        for critique in ["YES", "no", "Yesterday's picks were fine", "maybe?"] {
            let (orchestrator, _, observer) =
                build_test_orchestrator(MockGenerationClient::new(critique));

            let report = orchestrator.run(QUERY).await.expect("run should succeed");

            let expected = critique.to_uppercase().contains("YES");
            assert_eq!(report.outcome.is_approved(), expected, "critique: {}", critique);

            let terminal: Vec<String> = observer
                .events()
                .into_iter()
                .filter(|e| e.starts_with("finished") || e == "aborted")
                .collect();
            assert_eq!(terminal.len(), 1, "critique: {}", critique);
        }
    }

    #[tokio::test]
    async fn test_stages_run_in_fixed_order() {
        let (orchestrator, client, observer) =
            build_test_orchestrator(MockGenerationClient::new("YES"));

        orchestrator.run(QUERY).await.unwrap();

        assert_eq!(client.calls(), vec!["profiler", "researcher", "curator", "critic"]);
        assert_eq!(
            observer.events(),
            vec![
                "run_started",
                "INIT->PROFILING",
                "start:Profiler",
                "finish:Profiler",
                "PROFILING->RESEARCHING",
                "start:Researcher",
                "finish:Researcher",
                "RESEARCHING->CURATING",
                "start:Curator",
                "finish:Curator",
                "CURATING->CRITIQUING",
                "start:Critic",
                "finish:Critic",
                "CRITIQUING->DONE",
                "finished:true",
            ]
        );
    }

    #[tokio::test]
    async fn test_researcher_failure_aborts_run() {
        let (orchestrator, client, observer) = build_test_orchestrator(
            MockGenerationClient::new("YES").failing_on("researcher"),
        );

        let error = orchestrator.run(QUERY).await.expect_err("run should abort");

        match &error {
            RunError::Stage { phase, source, .. } => {
                assert_eq!(*phase, Phase::Researching);
                assert!(matches!(
                    source,
                    PipelineError::Generation {
                        source: GenerationError::Transport(_),
                        ..
                    }
                ));
            }
            other => panic!("expected stage error, got {:?}", other),
        }

        let state = error.partial_state().expect("partial state is kept");
        assert_eq!(state.profile().unwrap(), PROFILE);
        assert!(state.draft().is_err());
        assert!(state.critique().is_err());
        assert!(!state.approved());

        assert_eq!(client.calls(), vec!["profiler", "researcher"]);
        let events = observer.events();
        assert!(events.contains(&"RESEARCHING->ABORTED".to_string()));
        assert_eq!(events.last().unwrap(), "aborted");
        assert!(!events.iter().any(|e| e.starts_with("finished")));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected_before_any_call() {
        let (orchestrator, client, _) = build_test_orchestrator(MockGenerationClient::new("YES"));

        let error = orchestrator.run("   ").await.expect_err("blank query");

        assert!(matches!(error, RunError::InvalidQuery(PipelineError::EmptyQuery)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_aborts_run() {
        let (orchestrator, _, _) = build_test_orchestrator(MockGenerationClient::new("   "));

        let error = orchestrator.run(QUERY).await.expect_err("empty critique");

        match error {
            RunError::Stage { phase, source, state } => {
                assert_eq!(phase, Phase::Critiquing);
                assert!(matches!(source, PipelineError::EmptyOutput { .. }));
                assert_eq!(state.draft().unwrap(), DRAFT);
            }
            other => panic!("expected stage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_run_aborts() {
        let (orchestrator, client, _) = build_test_orchestrator(MockGenerationClient::new("YES"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let error = orchestrator
            .run_with_cancel(QUERY, cancel)
            .await
            .expect_err("cancelled run");

        assert!(matches!(
            error,
            RunError::Stage {
                phase: Phase::Profiling,
                source: PipelineError::Cancelled { .. },
                ..
            }
        ));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_strict_gate_setting_is_applied() {
        let client = Arc::new(MockGenerationClient::new("Yesterday's picks were fine"));
        let settings = OrchestratorSettings {
            gate: GatePolicy::Strict,
            ..OrchestratorSettings::default()
        };
        let orchestrator = Orchestrator::new(client, settings);

        let report = orchestrator.run(QUERY).await.unwrap();

        assert_eq!(
            report.outcome,
            RunOutcome::Rejected {
                critique: "Yesterday's picks were fine".to_string(),
                verdict: Verdict::Ambiguous,
            }
        );
    }

    #[tokio::test]
    async fn test_out_of_order_pipeline_is_illegal() {
        // Curator before Profiler/Researcher.
        let stages = Arc::new(
            StagePipeline::new()
                .add_stage(CuratorStage::default())
                .add_stage(ProfilerStage)
                .add_stage(CriticStage::default()),
        );
        let client = Arc::new(MockGenerationClient::new("YES"));
        let orchestrator =
            Orchestrator::with_pipeline(client.clone(), stages, OrchestratorSettings::default());

        let error = orchestrator.run(QUERY).await.expect_err("illegal order");

        assert!(matches!(
            error,
            RunError::IllegalTransition {
                from: Phase::Init,
                to: Phase::Curating,
                ..
            }
        ));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_illegal_transition_keeps_partial_state() {
        // Profiler, then straight to the Critic.
        let stages = Arc::new(
            StagePipeline::new()
                .add_stage(ProfilerStage)
                .add_stage(CriticStage::default()),
        );
        let client = Arc::new(MockGenerationClient::new("YES"));
        let orchestrator =
            Orchestrator::with_pipeline(client.clone(), stages, OrchestratorSettings::default());

        let error = orchestrator.run(QUERY).await.expect_err("illegal order");

        assert!(matches!(
            error,
            RunError::IllegalTransition {
                from: Phase::Profiling,
                to: Phase::Critiquing,
                ..
            }
        ));
        let state = error.partial_state().expect("partial state is kept");
        assert_eq!(state.profile().unwrap(), PROFILE);
        assert!(state.research().is_err());
        assert_eq!(client.calls(), vec!["profiler"]);
    }

    #[tokio::test]
    async fn test_concurrent_runs_do_not_share_state() {
        let (orchestrator, _, _) = build_test_orchestrator(MockGenerationClient::new("YES"));

        let first = orchestrator.clone();
        let second = orchestrator.clone();
        let (a, b) = tokio::join!(
            async move { first.run("noir thrillers").await },
            async move { second.run("space operas").await }
        );

        assert_eq!(a.unwrap().state.query(), "noir thrillers");
        assert_eq!(b.unwrap().state.query(), "space operas");
    }

    #[tokio::test]
    async fn test_report_serializes_with_tagged_outcome() {
        let (orchestrator, _, _) = build_test_orchestrator(MockGenerationClient::new("YES"));
        let report = orchestrator.run(QUERY).await.unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["outcome"], "approved");
        assert_eq!(json["state"]["query"], QUERY);
        assert!(json["elapsed"].is_u64());
    }
}
