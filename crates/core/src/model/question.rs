use thiserror::Error;

/// Every question offers at least this many options.
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question needs at least {min} options, got {count}", min = MIN_OPTIONS)]
    TooFewOptions { count: usize },

    #[error("correct index {index} is out of range for {count} options")]
    CorrectIndexOutOfRange { index: usize, count: usize },

    #[error("option {index} is out of range for {count} options")]
    OptionOutOfRange { index: usize, count: usize },
}

/// A multiple-choice question and the player's current pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_index: usize,
    selected: Option<usize>,
}

impl Question {
    /// Creates an unanswered question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, fewer than
    /// [`MIN_OPTIONS`] options are given, or `correct_index` is out of range.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                count: options.len(),
            });
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                count: options.len(),
            });
        }

        Ok(Self {
            text,
            options,
            correct_index,
            selected: None,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.selected.is_some()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.correct_index)
    }

    /// Select an option, replacing any earlier pick.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::OptionOutOfRange` if `option` is not a valid index.
    pub fn select(&mut self, option: usize) -> Result<(), QuestionError> {
        if option >= self.options.len() {
            return Err(QuestionError::OptionOutOfRange {
                index: option,
                count: self.options.len(),
            });
        }
        self.selected = Some(option);
        Ok(())
    }

    /// Restore a previously persisted pick. Out-of-range picks leave the
    /// question unanswered. Returns whether a pick was applied.
    pub fn restore(&mut self, saved: Option<usize>) -> bool {
        self.selected = saved.filter(|option| *option < self.options.len());
        self.selected.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Option {i}")).collect()
    }

    #[test]
    fn validates_shape() {
        assert_eq!(
            Question::new(" ", options(2), 0).unwrap_err(),
            QuestionError::EmptyText
        );
        assert_eq!(
            Question::new("Q", options(1), 0).unwrap_err(),
            QuestionError::TooFewOptions { count: 1 }
        );
        assert_eq!(
            Question::new("Q", options(3), 3).unwrap_err(),
            QuestionError::CorrectIndexOutOfRange { index: 3, count: 3 }
        );
    }

    #[test]
    fn reselecting_overwrites() {
        let mut q = Question::new("Q", options(3), 2).unwrap();
        q.select(0).unwrap();
        assert!(!q.is_correct());
        q.select(2).unwrap();
        assert_eq!(q.selected(), Some(2));
        assert!(q.is_correct());
        assert!(q.select(5).is_err());
        assert_eq!(q.selected(), Some(2));
    }

    #[test]
    fn restore_ignores_out_of_range() {
        let mut q = Question::new("Q", options(2), 0).unwrap();
        assert!(!q.restore(Some(9)));
        assert!(!q.is_answered());
        assert!(q.restore(Some(1)));
        assert_eq!(q.selected(), Some(1));
    }
}
