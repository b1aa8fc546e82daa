//! Core types shared across the harness.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Fold the direction into a ±1 multiplier so all comparisons can be
    /// written as minimization. `Minimize` is +1, `Maximize` is -1.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Minimize => 1.0,
            Self::Maximize => -1.0,
        }
    }
}

impl core::str::FromStr for Direction {
    type Err = Error;

    /// Parse `"minimize"` or `"maximize"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirection`] for anything else. This is the
    /// fail-fast configuration check for callers wiring a study from
    /// string config.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimize" => Ok(Self::Minimize),
            "maximize" => Ok(Self::Maximize),
            other => Err(Error::InvalidDirection {
                got: other.to_string(),
            }),
        }
    }
}

/// The state of a trial in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrialState {
    /// The trial is currently running.
    Running,
    /// The trial completed successfully.
    Complete,
    /// The trial was stopped early by the pruner.
    Pruned,
    /// The trial failed with an error.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_folds_both_directions() {
        assert!((Direction::Minimize.sign() - 1.0).abs() < f64::EPSILON);
        assert!((Direction::Maximize.sign() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_recognized_directions() {
        assert_eq!("minimize".parse::<Direction>().unwrap(), Direction::Minimize);
        assert_eq!("maximize".parse::<Direction>().unwrap(), Direction::Maximize);
    }

    #[test]
    fn parse_rejects_unknown_direction() {
        let err = "ascend".parse::<Direction>().unwrap_err();
        assert!(matches!(err, Error::InvalidDirection { got } if got == "ascend"));
    }
}
