//! Core domain types for the lift tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Progression phases of the triple-progression state machine
//! - Per-exercise records as persisted in the roster
//! - The roster itself (user → exercise → record)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Progression Phase
// ============================================================================

/// Number of sets performed in a deload session, regardless of base sets.
pub const RECOVERY_SETS: u32 = 2;

/// Upper bound accepted for `base_sets`
pub const MAX_BASE_SETS: u32 = 100;

/// Upper bound accepted for `base_reps` and for reps logged in one set
pub const MAX_REPS_PER_SET: u32 = 1000;

/// Extra reps over `base_sets * base_reps` required to clear phase B
pub const VOLUME_BONUS_REPS: u32 = 3;

/// Phase of the triple-progression cycle.
///
/// Persisted as the single letters `"A"`..`"D"`. Any other persisted value is
/// kept verbatim in `Unrecognized` so it can be reported instead of guessed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    /// Baseline: every set must hit the rep target
    A,
    /// Volume challenge: beat the total-rep target
    B,
    /// Extra-set challenge: one more set at the rep target
    C,
    /// Deload: two easy sets at reduced weight
    D,
    Unrecognized(String),
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::A => "A",
            Phase::B => "B",
            Phase::C => "C",
            Phase::D => "D",
            Phase::Unrecognized(raw) => raw,
        }
    }

    /// Sets the lifter is expected to log while in this phase.
    ///
    /// Returns `None` for an unrecognized phase.
    pub fn expected_sets(&self, base_sets: u32) -> Option<u32> {
        match self {
            Phase::A | Phase::B => Some(base_sets),
            Phase::C => Some(base_sets.saturating_add(1)),
            Phase::D => Some(RECOVERY_SETS),
            Phase::Unrecognized(_) => None,
        }
    }
}

impl From<String> for Phase {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "A" => Phase::A,
            "B" => Phase::B,
            "C" => Phase::C,
            "D" => Phase::D,
            _ => Phase::Unrecognized(raw),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Exercise Record
// ============================================================================

/// Progression record for one exercise of one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRecord {
    /// Working weight for the next session; `None` until onboarding
    pub current_weight: Option<f64>,
    #[serde(default = "default_weight_increment")]
    pub weight_increment: f64,
    pub base_sets: u32,
    pub base_reps: u32,
    pub current_state: Phase,
    #[serde(default)]
    pub stuck_counter: u32,
    #[serde(default)]
    pub previous_total_reps: u32,
}

pub(crate) fn default_weight_increment() -> f64 {
    2.5
}

impl ExerciseRecord {
    /// Fresh record for a newly added exercise (phase A, no weight yet).
    pub fn new(base_sets: u32, base_reps: u32, weight_increment: f64) -> Self {
        Self {
            current_weight: None,
            weight_increment,
            base_sets,
            base_reps,
            current_state: Phase::A,
            stuck_counter: 0,
            previous_total_reps: 0,
        }
    }

    /// Whether a starting weight has been recorded yet
    pub fn is_onboarded(&self) -> bool {
        self.current_weight.is_some()
    }

    /// Sets expected for the next session, `None` if the phase is unrecognized
    pub fn expected_sets(&self) -> Option<u32> {
        self.current_state.expected_sets(self.base_sets)
    }

    /// Total reps needed to pass the volume challenge (phase B)
    ///
    /// Saturates instead of overflowing for records that fail `validate`.
    pub fn volume_target(&self) -> u32 {
        self.base_sets
            .saturating_mul(self.base_reps)
            .saturating_add(VOLUME_BONUS_REPS)
    }

    /// Check the numeric invariants the engine relies on.
    ///
    /// The phase is not checked here; an unrecognized phase is a distinct
    /// error raised by the engine.
    pub fn validate(&self) -> Result<()> {
        if !(self.weight_increment.is_finite() && self.weight_increment > 0.0) {
            return Err(Error::InvalidRecord(format!(
                "weight_increment must be > 0, got {}",
                self.weight_increment
            )));
        }
        if !(1..=MAX_BASE_SETS).contains(&self.base_sets) {
            return Err(Error::InvalidRecord(format!(
                "base_sets must be between 1 and {}, got {}",
                MAX_BASE_SETS, self.base_sets
            )));
        }
        if !(1..=MAX_REPS_PER_SET).contains(&self.base_reps) {
            return Err(Error::InvalidRecord(format!(
                "base_reps must be between 1 and {}, got {}",
                MAX_REPS_PER_SET, self.base_reps
            )));
        }
        if let Some(weight) = self.current_weight {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(Error::InvalidRecord(format!(
                    "current_weight must be >= 0, got {}",
                    weight
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Roster
// ============================================================================

/// All users and their exercise records.
///
/// Serialized as `{ "<user>": { "<exercise>": ExerciseRecord } }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pub users: BTreeMap<String, BTreeMap<String, ExerciseRecord>>,
}
