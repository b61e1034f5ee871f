//! Pass/fail classification and feedback tiers.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("{name} must be within 0..=100, got {value}")]
    PercentOutOfRange { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    Passed,
    Failed,
}

/// Message tier for a single finished level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Mastered,
    Passed,
    KeepPracticing,
}

/// Message tier for the running average across levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Excellent,
    Solid,
    KeepLearning,
}

/// Thresholds (in percent) applied to a finished level.
///
/// All comparisons are inclusive: a score equal to a threshold meets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringPolicy {
    pass_percent: f64,
    volunteer_percent: f64,
    mastery_percent: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            pass_percent: 70.0,
            volunteer_percent: 80.0,
            mastery_percent: 90.0,
        }
    }
}

impl ScoringPolicy {
    /// # Errors
    ///
    /// Returns `ScoringError::PercentOutOfRange` if any threshold is outside `0..=100`.
    pub fn new(
        pass_percent: f64,
        volunteer_percent: f64,
        mastery_percent: f64,
    ) -> Result<Self, ScoringError> {
        check_percent("pass_percent", pass_percent)?;
        check_percent("volunteer_percent", volunteer_percent)?;
        check_percent("mastery_percent", mastery_percent)?;
        Ok(Self {
            pass_percent,
            volunteer_percent,
            mastery_percent,
        })
    }

    #[must_use]
    pub fn pass_percent(&self) -> f64 {
        self.pass_percent
    }

    #[must_use]
    pub fn volunteer_percent(&self) -> f64 {
        self.volunteer_percent
    }

    #[must_use]
    pub fn mastery_percent(&self) -> f64 {
        self.mastery_percent
    }

    #[must_use]
    pub fn outcome(&self, percent: f64) -> LevelOutcome {
        if percent >= self.pass_percent {
            LevelOutcome::Passed
        } else {
            LevelOutcome::Failed
        }
    }

    #[must_use]
    pub fn volunteer_eligible(&self, percent: f64) -> bool {
        percent >= self.volunteer_percent
    }

    #[must_use]
    pub fn feedback(&self, percent: f64) -> Feedback {
        if percent >= self.mastery_percent {
            Feedback::Mastered
        } else if percent >= self.pass_percent {
            Feedback::Passed
        } else {
            Feedback::KeepPracticing
        }
    }

    #[must_use]
    pub fn performance(&self, average_percent: f64) -> Performance {
        if average_percent >= self.mastery_percent {
            Performance::Excellent
        } else if average_percent >= self.pass_percent {
            Performance::Solid
        } else {
            Performance::KeepLearning
        }
    }
}

fn check_percent(name: &'static str, value: f64) -> Result<(), ScoringError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ScoringError::PercentOutOfRange { name, value })
    }
}

/// `100 * score / total`, or `0.0` when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(score: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (score as f64) * 100.0 / (total as f64)
}
