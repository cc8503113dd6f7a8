//! Pipeline state carried between stages.
//!
//! One `PipelineState` lives for exactly one run. Every field after `query`
//! is written once, by one stage, and reading a field before its stage has
//! run is an error rather than an empty string.

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::gate::Verdict;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    query: String,
    profile: Option<String>,
    research: Option<String>,
    draft: Option<String>,
    critique: Option<String>,
    verdict: Option<Verdict>,
    approved: bool,
}

impl PipelineState {
    /// Start a run for `query`; blank queries are rejected.
    ///
    /// The query is kept exactly as typed.
    pub fn new(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        Ok(Self {
            query: query.to_string(),
            profile: None,
            research: None,
            draft: None,
            critique: None,
            verdict: None,
            approved: false,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn profile(&self) -> Result<&str> {
        read("profile", &self.profile)
    }

    pub fn research(&self) -> Result<&str> {
        read("research", &self.research)
    }

    pub fn draft(&self) -> Result<&str> {
        read("draft", &self.draft)
    }

    pub fn critique(&self) -> Result<&str> {
        read("critique", &self.critique)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn set_profile(&mut self, text: String) -> Result<()> {
        write_once("profile", &mut self.profile, text)
    }

    pub fn set_research(&mut self, text: String) -> Result<()> {
        write_once("research", &mut self.research, text)
    }

    pub fn set_draft(&mut self, text: String) -> Result<()> {
        write_once("draft", &mut self.draft, text)
    }

    /// Record the critic's review and the gate decision together.
    pub fn record_critique(&mut self, text: String, verdict: Verdict) -> Result<()> {
        write_once("critique", &mut self.critique, text)?;
        self.verdict = Some(verdict);
        self.approved = verdict.is_approved();
        Ok(())
    }

    /// Names of the fields written so far, in pipeline order.
    pub fn written_fields(&self) -> Vec<&'static str> {
        [
            ("profile", self.profile.is_some()),
            ("research", self.research.is_some()),
            ("draft", self.draft.is_some()),
            ("critique", self.critique.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

fn read<'a>(field: &'static str, slot: &'a Option<String>) -> Result<&'a str> {
    slot.as_deref().ok_or(PipelineError::MissingField { field })
}

fn write_once(field: &'static str, slot: &mut Option<String>, text: String) -> Result<()> {
    if slot.is_some() {
        return Err(PipelineError::FieldAlreadySet { field });
    }
    *slot = Some(text);
    Ok(())
}
