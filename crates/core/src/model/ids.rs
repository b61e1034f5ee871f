use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelNumberError {
    #[error("level numbers start at 1")]
    Zero,

    #[error("invalid level number: {raw}")]
    Parse { raw: String },
}

/// One-based number identifying a level in the campaign.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LevelNumber(u32);

impl LevelNumber {
    /// The level every new campaign starts on.
    pub const FIRST: Self = Self(1);

    /// Creates a new `LevelNumber`
    ///
    /// # Errors
    ///
    /// Returns `LevelNumberError::Zero` for `0`.
    pub fn new(value: u32) -> Result<Self, LevelNumberError> {
        if value == 0 {
            return Err(LevelNumberError::Zero);
        }
        Ok(Self(value))
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// The level following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for LevelNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for LevelNumber {
    type Error = LevelNumberError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LevelNumber> for u32 {
    fn from(level: LevelNumber) -> Self {
        level.0
    }
}

impl fmt::Debug for LevelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LevelNumber({})", self.0)
    }
}

impl fmt::Display for LevelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LevelNumber {
    type Err = LevelNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s.trim().parse().map_err(|_| LevelNumberError::Parse {
            raw: s.to_owned(),
        })?;
        Self::new(value)
    }
}
