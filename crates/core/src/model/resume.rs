use serde::{Deserialize, Serialize};

use crate::model::ids::LevelNumber;

/// Snapshot of a level in progress, persisted after every answer.
///
/// `selections` is aligned with the level's questions; `None` means unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeState {
    pub level: LevelNumber,
    pub question_index: usize,
    pub score: usize,
    pub selections: Vec<Option<usize>>,
}
