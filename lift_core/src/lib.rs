#![forbid(unsafe_code)]

//! Core domain model and business logic for the lift tracker.
//!
//! This crate provides:
//! - Domain types (progression phases, exercise records, roster)
//! - Session input parsing
//! - The triple-progression engine
//! - Roster persistence (locked, atomic JSON)
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod session;
pub mod progression;
pub mod roster;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use session::SessionInput;
pub use progression::{apply_session, describe_plan, plan_for, Plan, SessionOutcome, Transition};
pub use roster::{record_session, JsonRosterStore, RecordStore};
