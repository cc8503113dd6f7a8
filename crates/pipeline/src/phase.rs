//! Named phases of a grid run.
//!
//! ```text
//! INIT -> PROFILING -> RESEARCHING -> CURATING -> CRITIQUING -> DONE
//!              \            \             \            \
//!               +------------+-------------+------------+--> ABORTED
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    Profiling,
    Researching,
    Curating,
    Critiquing,
    Done,
    Aborted,
}

impl Phase {
    /// The phase that follows this one on a successful run.
    pub fn successor(self) -> Option<Phase> {
        match self {
            Phase::Init => Some(Phase::Profiling),
            Phase::Profiling => Some(Phase::Researching),
            Phase::Researching => Some(Phase::Curating),
            Phase::Curating => Some(Phase::Critiquing),
            Phase::Critiquing => Some(Phase::Done),
            Phase::Done | Phase::Aborted => None,
        }
    }

    /// True while a stage owns the run.
    pub fn is_working(self) -> bool {
        matches!(
            self,
            Phase::Profiling | Phase::Researching | Phase::Curating | Phase::Critiquing
        )
    }

    /// Only the fixed successor, or abort from a working phase, is legal.
    pub fn can_transition_to(self, to: Phase) -> bool {
        self.successor() == Some(to) || (to == Phase::Aborted && self.is_working())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::Profiling => "PROFILING",
            Phase::Researching => "RESEARCHING",
            Phase::Curating => "CURATING",
            Phase::Critiquing => "CRITIQUING",
            Phase::Done => "DONE",
            Phase::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
