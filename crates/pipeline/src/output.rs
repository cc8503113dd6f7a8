//! Structured result of one stage invocation.

use genai_client::Generation;
use serde::Serialize;

/// Raw text from the generation client plus a validity flag.
///
/// The text itself is never parsed; `valid` only records whether there is
/// anything in it, so a blank answer stops the run at the stage that
/// produced it instead of leaking into the next prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutput {
    pub text: String,
    pub valid: bool,
    pub sources: Vec<String>,
}

impl StageOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self::from(Generation::new(text))
    }
}

impl From<Generation> for StageOutput {
    fn from(generation: Generation) -> Self {
        let valid = !generation.text.trim().is_empty();
        Self {
            text: generation.text,
            valid,
            sources: generation.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_flag() {
        assert!(StageOutput::new("Blade Runner").valid);
        assert!(!StageOutput::new("").valid);
        assert!(!StageOutput::new("  \n ").valid);
    }

    #[test]
    fn test_keeps_sources() {
        let output = StageOutput::from(Generation {
            text: "list".to_string(),
            sources: vec!["https://imdb.com".to_string()],
        });
        assert_eq!(output.sources, vec!["https://imdb.com".to_string()]);
    }
}
