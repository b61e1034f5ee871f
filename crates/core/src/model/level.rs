use thiserror::Error;

use crate::model::ids::LevelNumber;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("level {0} has no questions")]
    NoQuestions(LevelNumber),
}

/// A titled, ordered set of questions.
///
/// Only the per-question selections change after a level is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    number: LevelNumber,
    title: String,
    summary: Option<String>,
    questions: Vec<Question>,
}

impl Level {
    /// Builds a level. A blank summary is treated as no summary.
    ///
    /// # Errors
    ///
    /// Returns `LevelError::NoQuestions` if `questions` is empty.
    pub fn new(
        number: LevelNumber,
        title: impl Into<String>,
        summary: Option<String>,
        questions: Vec<Question>,
    ) -> Result<Self, LevelError> {
        if questions.is_empty() {
            return Err(LevelError::NoQuestions(number));
        }
        let summary = summary.filter(|text| !text.trim().is_empty());

        Ok(Self {
            number,
            title: title.into(),
            summary,
            questions,
        })
    }

    #[must_use]
    pub fn number(&self) -> LevelNumber {
        self.number
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub(crate) fn question_mut(&mut self, index: usize) -> Option<&mut Question> {
        self.questions.get_mut(index)
    }

    /// Number of questions; never zero.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Merge saved picks into the questions by index.
    ///
    /// Questions beyond the end of `saved` stay unanswered. Returns the number
    /// of picks applied.
    pub fn apply_selections(&mut self, saved: &[Option<usize>]) -> usize {
        let mut applied = 0;
        for (i, q) in self.questions.iter_mut().enumerate() {
            if q.restore(saved.get(i).copied().flatten()) {
                applied += 1;
            }
        }
        applied
    }

    /// Current picks, aligned with the questions.
    #[must_use]
    pub fn selections(&self) -> Vec<Option<usize>> {
        self.questions.iter().map(Question::selected).collect()
    }

    pub fn clear_selections(&mut self) {
        for q in &mut self.questions {
            q.clear_selection();
        }
    }
}
