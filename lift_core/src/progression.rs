//! Triple-progression engine.
//!
//! This module implements the per-exercise state machine:
//! - A (baseline): every set hits the rep target → add weight
//! - B (volume): beat `base_sets * base_reps + 3` total reps → add weight
//! - C (extra set): one more set at the rep target → add weight, or deload
//! - D (deload): two recovery sets at ~90% weight, then back to A
//!
//! Both entry points are pure: they read the record they are given and
//! never touch storage.

use crate::{Error, ExerciseRecord, Phase, Result, SessionInput};
use std::fmt;

/// Consecutive non-improving volume sessions before escalating to phase C
pub const STUCK_LIMIT: u32 = 2;

/// Fraction of the working weight kept when deloading
pub const DELOAD_FACTOR: f64 = 0.9;

/// Weights are kept to the nearest gram
const WEIGHT_STEPS_PER_KG: f64 = 1000.0;

/// Which branch of the state machine fired for a session
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    /// A passed: weight goes up, stay in A
    BaselineCleared { increment: f64 },
    /// A missed: start the volume challenge
    BaselineMissed { total_reps: u32 },
    /// B passed: weight goes up, back to A
    VolumeCleared {
        total_reps: u32,
        target: u32,
        increment: f64,
    },
    /// B missed but not yet stuck long enough to escalate
    VolumeContinues {
        total_reps: u32,
        previous_total_reps: u32,
        stuck_counter: u32,
    },
    /// B missed too many times in a row: move to the extra-set challenge
    VolumeStalled { total_reps: u32 },
    /// C passed: weight goes up, back to A
    ExtraSetCleared { increment: f64 },
    /// C missed: cut the weight and deload
    Deloaded { from: f64, to: f64 },
    /// D done: back to A at the deloaded weight
    RecoveryComplete,
}

impl Transition {
    /// Phase the record is in after this transition
    pub fn next_phase(&self) -> Phase {
        match self {
            Transition::BaselineCleared { .. }
            | Transition::VolumeCleared { .. }
            | Transition::ExtraSetCleared { .. }
            | Transition::RecoveryComplete => Phase::A,
            Transition::BaselineMissed { .. } | Transition::VolumeContinues { .. } => Phase::B,
            Transition::VolumeStalled { .. } => Phase::C,
            Transition::Deloaded { .. } => Phase::D,
        }
    }

    /// Whether the working weight went up
    pub fn is_weight_increase(&self) -> bool {
        matches!(
            self,
            Transition::BaselineCleared { .. }
                | Transition::VolumeCleared { .. }
                | Transition::ExtraSetCleared { .. }
        )
    }
}

/// Result of evaluating one session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOutcome {
    pub record: ExerciseRecord,
    pub transition: Transition,
}

/// Target for the next session, derived from a record
#[derive(Clone, Debug, PartialEq)]
pub enum Plan {
    Baseline {
        sets: u32,
        reps: u32,
        weight: Option<f64>,
    },
    Volume {
        total_reps: u32,
        weight: Option<f64>,
    },
    ExtraSet {
        sets: u32,
        reps: u32,
        weight: Option<f64>,
    },
    Deload {
        sets: u32,
        weight: Option<f64>,
    },
    Unrecognized(String),
}

/// Render a weight for display ("not set" before onboarding)
pub fn format_weight(weight: Option<f64>) -> String {
    match weight {
        Some(w) => format!("{}kg", round_weight(w)),
        None => "not set".to_string(),
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Baseline { sets, reps, weight } => write!(
                f,
                "State A: complete {} sets of at least {} reps each. Current weight: {}",
                sets,
                reps,
                format_weight(*weight)
            ),
            Plan::Volume { total_reps, weight } => write!(
                f,
                "State B: accumulate at least {} total reps across all sets \
                 (add reps to any set). Current weight: {}",
                total_reps,
                format_weight(*weight)
            ),
            Plan::ExtraSet { sets, reps, weight } => write!(
                f,
                "State C: complete {} sets of at least {} reps each. Current weight: {}",
                sets,
                reps,
                format_weight(*weight)
            ),
            Plan::Deload { sets, weight } => write!(
                f,
                "State D (deload): complete {} easy recovery sets. \
                 Current weight (reduced ~10%): {}",
                sets,
                format_weight(*weight)
            ),
            Plan::Unrecognized(raw) => write!(f, "Unrecognized state: {:?}", raw),
        }
    }
}

/// Structured target for the next session
pub fn plan_for(record: &ExerciseRecord) -> Plan {
    let weight = record.current_weight;
    match &record.current_state {
        Phase::A => Plan::Baseline {
            sets: record.base_sets,
            reps: record.base_reps,
            weight,
        },
        Phase::B => Plan::Volume {
            total_reps: record.volume_target(),
            weight,
        },
        Phase::C => Plan::ExtraSet {
            sets: record.base_sets.saturating_add(1),
            reps: record.base_reps,
            weight,
        },
        Phase::D => Plan::Deload {
            sets: crate::RECOVERY_SETS,
            weight,
        },
        Phase::Unrecognized(raw) => Plan::Unrecognized(raw.clone()),
    }
}

/// Human-readable target for the next session
pub fn describe_plan(record: &ExerciseRecord) -> String {
    plan_for(record).to_string()
}

/// Snap `value` to the nearest multiple of `increment`.
///
/// Ties round away from zero (`f64::round`).
pub fn quantize_to_increment(value: f64, increment: f64) -> f64 {
    (value / increment).round() * increment
}

/// Drop float noise below one gram, e.g. `60.300000000000004` → `60.3`
pub fn round_weight(weight: f64) -> f64 {
    (weight * WEIGHT_STEPS_PER_KG).round() / WEIGHT_STEPS_PER_KG
}

/// Weight used for a deload session after failing phase C
pub fn deload_weight(weight: f64, increment: f64) -> f64 {
    round_weight(quantize_to_increment(weight * DELOAD_FACTOR, increment))
}

/// Evaluate a completed session and produce the updated record.
///
/// Fails without touching `record` when the record is invalid, its phase is
/// unrecognized, it has no working weight yet, or the number of sets does not
/// match what the phase expects.
pub fn apply_session(record: &ExerciseRecord, input: &SessionInput) -> Result<SessionOutcome> {
    record.validate()?;

    let expected = record
        .expected_sets()
        .ok_or_else(|| Error::UnknownState(record.current_state.to_string()))?;

    let weight = record.current_weight.ok_or_else(|| {
        Error::InvalidRecord("starting weight has not been set".into())
    })?;

    if input.set_count() != expected as usize {
        return Err(Error::InvalidInput(format!(
            "state {} expects {} sets, got {}",
            record.current_state,
            expected,
            input.set_count()
        )));
    }

    let increment = record.weight_increment;
    let total_reps = input.total_reps();
    let mut next = record.clone();

    let transition = match &record.current_state {
        Phase::A => {
            if input.sets_meeting(record.base_reps) >= record.base_sets {
                next.current_weight = Some(round_weight(weight + increment));
                next.current_state = Phase::A;
                next.stuck_counter = 0;
                Transition::BaselineCleared { increment }
            } else {
                next.current_state = Phase::B;
                next.stuck_counter = 0;
                next.previous_total_reps = total_reps;
                Transition::BaselineMissed { total_reps }
            }
        }
        Phase::B => {
            let target = record.volume_target();
            if total_reps >= target {
                next.current_weight = Some(round_weight(weight + increment));
                next.current_state = Phase::A;
                next.stuck_counter = 0;
                Transition::VolumeCleared {
                    total_reps,
                    target,
                    increment,
                }
            } else {
                let previous_total_reps = record.previous_total_reps;
                next.stuck_counter = if total_reps <= previous_total_reps {
                    record.stuck_counter.saturating_add(1)
                } else {
                    0
                };
                next.previous_total_reps = total_reps;

                if next.stuck_counter >= STUCK_LIMIT {
                    next.current_state = Phase::C;
                    next.stuck_counter = 0;
                    Transition::VolumeStalled { total_reps }
                } else {
                    Transition::VolumeContinues {
                        total_reps,
                        previous_total_reps,
                        stuck_counter: next.stuck_counter,
                    }
                }
            }
        }
        Phase::C => {
            if input.sets_meeting(record.base_reps) >= record.base_sets.saturating_add(1) {
                next.current_weight = Some(round_weight(weight + increment));
                next.current_state = Phase::A;
                next.stuck_counter = 0;
                Transition::ExtraSetCleared { increment }
            } else {
                let to = deload_weight(weight, increment);
                next.current_weight = Some(to);
                next.current_state = Phase::D;
                next.stuck_counter = 0;
                Transition::Deloaded { from: weight, to }
            }
        }
        Phase::D => {
            next.current_state = Phase::A;
            next.stuck_counter = 0;
            Transition::RecoveryComplete
        }
        Phase::Unrecognized(raw) => return Err(Error::UnknownState(raw.clone())),
    };

    tracing::debug!(
        "Session {:?}: state {} -> {}, weight {} -> {}",
        input.reps(),
        record.current_state,
        next.current_state,
        format_weight(record.current_weight),
        format_weight(next.current_weight)
    );

    Ok(SessionOutcome {
        record: next,
        transition,
    })
}
