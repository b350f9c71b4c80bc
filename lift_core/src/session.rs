//! Per-set repetition counts for one completed workout.

use crate::{Error, Result, MAX_REPS_PER_SET};
use std::str::FromStr;

/// Reps achieved in each set, in the order performed.
///
/// Always non-empty and every count is between 1 and `MAX_REPS_PER_SET`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInput {
    reps: Vec<u32>,
}

impl SessionInput {
    pub fn new(reps: Vec<u32>) -> Result<Self> {
        if reps.is_empty() {
            return Err(Error::InvalidInput("no sets recorded".into()));
        }
        if let Some(pos) = reps.iter().position(|&r| r == 0) {
            return Err(Error::InvalidInput(format!(
                "set {} has zero reps; reps must be positive",
                pos + 1
            )));
        }
        if let Some(pos) = reps.iter().position(|&r| r > MAX_REPS_PER_SET) {
            return Err(Error::InvalidInput(format!(
                "set {} has {} reps; at most {} per set",
                pos + 1,
                reps[pos],
                MAX_REPS_PER_SET
            )));
        }
        Ok(Self { reps })
    }

    pub fn reps(&self) -> &[u32] {
        &self.reps
    }

    pub fn set_count(&self) -> usize {
        self.reps.len()
    }

    pub fn total_reps(&self) -> u32 {
        self.reps.iter().fold(0u32, |acc, &r| acc.saturating_add(r))
    }

    /// Number of sets that reached at least `target` reps
    pub fn sets_meeting(&self, target: u32) -> u32 {
        self.reps.iter().filter(|&&r| r >= target).count() as u32
    }
}

/// Parse whitespace-separated rep counts, e.g. `"8 8 7"`.
impl FromStr for SessionInput {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let reps = s
            .split_whitespace()
            .map(|token| {
                token.parse::<u32>().map_err(|_| {
                    Error::InvalidInput(format!("{:?} is not a whole number of reps", token))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(reps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_space_separated() {
        let input: SessionInput = "8 8 7".parse().unwrap();
        assert_eq!(input.reps(), &[8, 8, 7]);
        assert_eq!(input.total_reps(), 23);
        assert_eq!(input.set_count(), 3);
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let input: SessionInput = "  9\t9   9 \n".parse().unwrap();
        assert_eq!(input.reps(), &[9, 9, 9]);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            "   ".parse::<SessionInput>(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(SessionInput::new(vec![]), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_non_numeric_and_negative_rejected() {
        assert!("8 eight 8".parse::<SessionInput>().is_err());
        assert!("8 -1 8".parse::<SessionInput>().is_err());
        assert!("8 7.5".parse::<SessionInput>().is_err());
    }

    #[test]
    fn test_zero_reps_rejected() {
        assert!(matches!(
            "8 0 8".parse::<SessionInput>(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_set_rejected() {
        assert!(matches!(
            "4294967295 1 1".parse::<SessionInput>(),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            SessionInput::new(vec![8, MAX_REPS_PER_SET + 1]),
            Err(Error::InvalidInput(_))
        ));

        let input = SessionInput::new(vec![MAX_REPS_PER_SET; 3]).unwrap();
        assert_eq!(input.total_reps(), 3 * MAX_REPS_PER_SET);
    }

    #[test]
    fn test_sets_meeting() {
        let input = SessionInput::new(vec![8, 9, 7, 8]).unwrap();
        assert_eq!(input.sets_meeting(8), 3);
        assert_eq!(input.sets_meeting(10), 0);
    }
}
