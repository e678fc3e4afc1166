//! Numbered stop selection that bypasses the model
//!
//! After an ambiguous stop search the candidates are kept here. A bare
//! number on the next turn picks one of them directly.

use serde::{Deserialize, Serialize};

/// A stop offered to the user after an ambiguous search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopCandidate {
    #[serde(rename = "gtfsId")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// How a formatted tool result affects the pending selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionUpdate {
    #[default]
    Keep,
    Replace(Vec<StopCandidate>),
    Clear,
}

/// Where a user turn goes
#[derive(Debug, Clone, PartialEq)]
pub enum TurnRoute {
    /// Resolve locally against the pending candidate (0-based index)
    Selection { index: usize, candidate: StopCandidate },
    /// Forward to the model
    Model,
}

/// Candidates awaiting a numbered reply
///
/// Lifecycle: empty at session start, replaced by every stop search, cleared
/// by a successful selection. Turns that are not a valid selection leave it
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingSelection {
    candidates: Vec<StopCandidate>,
}

impl PendingSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how to handle the user's input
    ///
    /// A selection is the trimmed input consisting only of ASCII digits and
    /// naming a candidate in `1..=len`.
    pub fn route(&self, input: &str) -> TurnRoute {
        if self.candidates.is_empty() {
            return TurnRoute::Model;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return TurnRoute::Model;
        }
        match trimmed.parse::<usize>() {
            Ok(n) if (1..=self.candidates.len()).contains(&n) => TurnRoute::Selection {
                index: n - 1,
                candidate: self.candidates[n - 1].clone(),
            },
            _ => TurnRoute::Model,
        }
    }

    pub fn publish(&mut self, candidates: Vec<StopCandidate>) {
        self.candidates = candidates;
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }

    pub fn apply(&mut self, update: SelectionUpdate) {
        match update {
            SelectionUpdate::Keep => {}
            SelectionUpdate::Replace(candidates) => self.publish(candidates),
            SelectionUpdate::Clear => self.clear(),
        }
    }

    pub fn candidates(&self) -> &[StopCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
