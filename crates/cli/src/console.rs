//! Terminal rendering: persona banners while the grid runs, and the final
//! report once it stops.

use colored::Colorize;
use orchestrator::{ProgressObserver, RunError, RunOutcome, RunReport};
use pipeline::{MediaKind, Phase, Recommendation, Stage, StageOutput, Verdict, parse_recommendations};

/// Length of the critique preview printed after the critic stage.
pub const CRITIQUE_PREVIEW_CHARS: usize = 150;

const RULE: &str = "====================================================";

/// Prints one banner per stage, in the grid's voice.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn run_started(&self, query: &str) {
        println!("{}", RULE.cyan());
        println!("{}", "   NAIWATCHES AGENT GRID - INITIALIZING SEQUENCE    ".bold().cyan());
        println!("{}", RULE.cyan());
        println!("INPUT_SIGNAL: {}", query);
    }

    fn stage_started(&self, stage: &dyn Stage) {
        let (icon, intro) = stage_banner(stage.phase());
        println!();
        println!("{} [{}]: {}", icon, stage.persona().bold().magenta(), intro);
    }

    fn stage_finished(&self, stage: &dyn Stage, output: &StageOutput) {
        match stage.phase() {
            Phase::Critiquing => {
                println!(
                    "Critic Feedback: {}",
                    excerpt(&output.text, CRITIQUE_PREVIEW_CHARS)
                );
            }
            phase => {
                println!("Status: {}", stage_status(phase).green());
                if !output.sources.is_empty() {
                    println!("Sources: {} grounded links", output.sources.len());
                }
            }
        }
    }

    fn run_finished(&self, _report: &RunReport) {
        println!();
        println!("{}", RULE.cyan());
        println!("{}", "   SEQUENCE COMPLETE - FINAL OUTPUT DELIVERY       ".bold().cyan());
        println!("{}", RULE.cyan());
    }

    fn run_aborted(&self, _error: &RunError) {
        println!();
        println!("{}", RULE.red());
        println!("{}", "   SEQUENCE ABORTED - NO OUTPUT DELIVERED          ".bold().red());
        println!("{}", RULE.red());
    }
}

fn stage_banner(phase: Phase) -> (&'static str, &'static str) {
    match phase {
        Phase::Profiling => ("📟", "Deconstructing user intent..."),
        Phase::Researching => ("📡", "Scouring the digital grid for high-rated hits..."),
        Phase::Curating => ("🎚️", "Compiling the ultimate watch-list..."),
        Phase::Critiquing => ("🧐", "Performing quality assurance..."),
        _ => ("•", "Working..."),
    }
}

fn stage_status(phase: Phase) -> &'static str {
    match phase {
        Phase::Profiling => "Profile Locked.",
        Phase::Researching => "Database Sync Complete.",
        Phase::Curating => "Draft Compiled.",
        _ => "Done.",
    }
}

/// First `max_chars` characters of `text`, with an ellipsis if cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Render the final delivery block for a finished run.
pub fn render_report(report: &RunReport) -> String {
    match &report.outcome {
        RunOutcome::Approved { draft, .. } => {
            let body = match parse_recommendations(draft) {
                Some(recs) => render_cards(&recs),
                None => draft.trim().to_string(),
            };
            format!(
                "\n{}\n\n{}\n",
                "✅ SYSTEM APPROVED. FINAL RECOMMENDATIONS:".bold().green(),
                body
            )
        }
        RunOutcome::Rejected { critique, verdict } => {
            let mut out = format!(
                "\n{}\n{}\nCritique: {}\n",
                "❌ SYSTEM REJECTED. RE-MIXING REQUIRED.".bold().red(),
                "The Hype Checker found inconsistencies. Manual override recommended.",
                excerpt(critique, CRITIQUE_PREVIEW_CHARS)
            );
            if *verdict == Verdict::Ambiguous {
                out.push_str("(The critique gave no clear YES or NO.)\n");
            }
            out
        }
    }
}

fn render_cards(recs: &[Recommendation]) -> String {
    recs.iter()
        .enumerate()
        .map(|(i, rec)| {
            let kind = match rec.kind {
                MediaKind::Movie => "MOVIE",
                MediaKind::Series => "SERIES",
            };
            format!(
                "{}. {} ({}) [{}] ★ {}\n   {}",
                (i + 1).to_string().green(),
                rec.title.bold(),
                rec.year,
                kind,
                rec.rating.yellow(),
                rec.rationale
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
