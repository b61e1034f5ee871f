use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::LevelNumber;
use crate::scoring::{ScoringError, ScoringPolicy};

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("total levels must be > 0")]
    ZeroLevels,

    #[error("unknown continue policy: {raw} (expected `resume` or `restart`)")]
    UnknownContinuePolicy { raw: String },

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// What "Continue" does for a returning player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContinuePolicy {
    /// Pick up mid-level with saved answers, skipping the level summary.
    #[default]
    Resume,
    /// Start the saved level again from its summary.
    RestartLevel,
}

impl FromStr for ContinuePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resume" => Ok(Self::Resume),
            "restart" | "restart-level" => Ok(Self::RestartLevel),
            _ => Err(ConfigError::UnknownContinuePolicy { raw: s.to_owned() }),
        }
    }
}

impl fmt::Display for ContinuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resume => f.write_str("resume"),
            Self::RestartLevel => f.write_str("restart"),
        }
    }
}

/// Campaign-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    total_levels: u32,
    scoring: ScoringPolicy,
    continue_policy: ContinuePolicy,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_levels: Self::DEFAULT_TOTAL_LEVELS,
            scoring: ScoringPolicy::default(),
            continue_policy: ContinuePolicy::default(),
        }
    }
}

impl QuizConfig {
    pub const DEFAULT_TOTAL_LEVELS: u32 = 100;

    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLevels` if `total_levels` is zero.
    pub fn new(
        total_levels: u32,
        scoring: ScoringPolicy,
        continue_policy: ContinuePolicy,
    ) -> Result<Self, ConfigError> {
        if total_levels == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        Ok(Self {
            total_levels,
            scoring,
            continue_policy,
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLevels` if `total_levels` is zero.
    pub fn with_total_levels(mut self, total_levels: u32) -> Result<Self, ConfigError> {
        if total_levels == 0 {
            return Err(ConfigError::ZeroLevels);
        }
        self.total_levels = total_levels;
        Ok(self)
    }

    #[must_use]
    pub fn with_continue_policy(mut self, continue_policy: ContinuePolicy) -> Self {
        self.continue_policy = continue_policy;
        self
    }

    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    #[must_use]
    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    #[must_use]
    pub fn scoring(&self) -> ScoringPolicy {
        self.scoring
    }

    #[must_use]
    pub fn continue_policy(&self) -> ContinuePolicy {
        self.continue_policy
    }

    /// True for the configured final level (and anything past it).
    #[must_use]
    pub fn is_last_level(&self, level: LevelNumber) -> bool {
        level.value() >= self.total_levels
    }
}
