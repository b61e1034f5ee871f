use thiserror::Error;

/// Minimum number of non-whitespace characters in a player name.
pub const MIN_NAME_CHARS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlayerError {
    #[error("name must contain at least {min} characters", min = MIN_NAME_CHARS)]
    InvalidName,
}

/// The person taking the quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
}

impl Player {
    /// Validate a raw name as typed by the player.
    ///
    /// Surrounding whitespace is trimmed before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::InvalidName` if fewer than [`MIN_NAME_CHARS`]
    /// non-whitespace characters remain.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PlayerError> {
        let name = raw.as_ref().trim();
        let visible = name.chars().filter(|c| !c.is_whitespace()).count();
        if visible < MIN_NAME_CHARS {
            return Err(PlayerError::InvalidName);
        }
        Ok(Self {
            name: name.to_owned(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
