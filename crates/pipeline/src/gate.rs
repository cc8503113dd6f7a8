//! Approval gate: turns the critic's free text into a verdict.
//!
//! The critic is asked to answer YES or NO, but nothing forces the model to
//! comply, so the decision sits behind the `VerdictClassifier` trait and the
//! policy is chosen per run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
    /// The critic gave no recognisable answer.
    Ambiguous,
}

impl Verdict {
    pub fn is_approved(self) -> bool {
        self == Verdict::Approved
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Approved => "approved",
            Verdict::Rejected => "rejected",
            Verdict::Ambiguous => "ambiguous",
        };
        f.write_str(label)
    }
}

/// Core trait for gate policies.
pub trait VerdictClassifier: Send + Sync {
    /// Returns the name of this classifier (for logging/debugging)
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> Verdict;
}

/// Uppercased alphabetic words of `text`, in order.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
}

/// Approves whenever `YES` appears anywhere, in any case.
///
/// This matches inside other words too ("Yesterday" approves), so prefer
/// `StrictClassifier` when the model is reliable about leading with its
/// answer.
///
/// ## Algorithm
/// 1. Uppercased text contains `YES` -> Approved
/// 2. Some word is exactly `NO` or `REJECTED` -> Rejected
/// 3. Otherwise -> Ambiguous
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringClassifier;

impl VerdictClassifier for SubstringClassifier {
    fn name(&self) -> &str {
        "SubstringClassifier"
    }

    fn classify(&self, text: &str) -> Verdict {
        if text.to_uppercase().contains("YES") {
            Verdict::Approved
        } else if words(text).any(|w| w == "NO" || w == "REJECTED") {
            Verdict::Rejected
        } else {
            Verdict::Ambiguous
        }
    }
}

/// Decides on the first word only: `YES`/`APPROVED` or `NO`/`REJECTED`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictClassifier;

impl VerdictClassifier for StrictClassifier {
    fn name(&self) -> &str {
        "StrictClassifier"
    }

    fn classify(&self, text: &str) -> Verdict {
        match words(text).next().as_deref() {
            Some("YES") | Some("APPROVED") => Verdict::Approved,
            Some("NO") | Some("REJECTED") => Verdict::Rejected,
            _ => Verdict::Ambiguous,
        }
    }
}

/// Which classifier the critic stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    #[default]
    Substring,
    Strict,
}

impl GatePolicy {
    pub fn classifier(self) -> Box<dyn VerdictClassifier> {
        match self {
            GatePolicy::Substring => Box::new(SubstringClassifier),
            GatePolicy::Strict => Box::new(StrictClassifier),
        }
    }
}

impl FromStr for GatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(GatePolicy::Substring),
            "strict" => Ok(GatePolicy::Strict),
            other => Err(format!(
                "unknown gate policy '{}' (expected 'substring' or 'strict')",
                other
            )),
        }
    }
}

impl fmt::Display for GatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatePolicy::Substring => f.write_str("substring"),
            GatePolicy::Strict => f.write_str("strict"),
        }
    }
}
