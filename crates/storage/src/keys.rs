//! Names of the persisted keys.

use quiz_core::model::LevelNumber;

pub const PLAYER_NAME: &str = "player_name";
pub const CURRENT_LEVEL: &str = "current_level";
pub const CURRENT_QUESTION: &str = "current_question";
pub const CURRENT_SCORE: &str = "current_score";
pub const SCORE_HISTORY: &str = "score_history";

const SELECTIONS_PREFIX: &str = "selections:level:";

/// Key holding the saved picks for one level.
#[must_use]
pub fn selections(level: LevelNumber) -> String {
    format!("{SELECTIONS_PREFIX}{level}")
}
