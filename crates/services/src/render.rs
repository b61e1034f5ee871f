//! The presentation seam. The controller calls a [`Renderer`] after every
//! state change; the renderer forwards user input back as controller calls.

use quiz_core::model::{LevelNumber, Player, PlayerError, Question};
use quiz_core::{LevelResult, Performance, ProgressSummary};

/// Level overview shown before the first question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryView<'a> {
    pub level: LevelNumber,
    pub title: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionView<'a> {
    pub level: LevelNumber,
    pub title: &'a str,
    pub index: usize,
    pub total: usize,
    pub text: &'a str,
    pub options: &'a [String],
    pub selected: Option<usize>,
}

impl<'a> QuestionView<'a> {
    #[must_use]
    pub fn new(level: LevelNumber, title: &'a str, index: usize, total: usize, question: &'a Question) -> Self {
        Self {
            level,
            title,
            index,
            total,
            text: question.text(),
            options: question.options(),
            selected: question.selected(),
        }
    }

    /// The next control is enabled only once an option is picked.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.selected.is_some()
    }

    /// Share of the level answered before this question, in `0.0..1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.index as f64 / self.total as f64
    }
}

/// Everything shown once a level is finished.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub player_name: Option<String>,
    pub result: LevelResult,
    pub progress: ProgressSummary,
    pub performance: Option<Performance>,
    pub next_level_available: bool,
    pub campaign_complete: bool,
}

pub trait Renderer {
    /// Ask for a name; `rejected` explains why the last one was refused.
    fn name_prompt(&mut self, rejected: Option<&PlayerError>);

    /// Offer a returning player Continue or Restart from beginning.
    fn welcome_back(&mut self, player: &Player);

    /// A level fetch is in flight; input should be disabled.
    fn loading(&mut self, level: LevelNumber);

    fn summary(&mut self, view: &SummaryView<'_>);

    fn question(&mut self, view: &QuestionView<'_>);

    fn result(&mut self, view: &ResultView);

    /// The level could not be loaded; offer retry.
    fn load_error(&mut self, level: LevelNumber);

    /// Advisory call to action after a high score.
    fn volunteer_prompt(&mut self) {}

    /// Progress was saved and the session has ended.
    fn progress_saved(&mut self, level: LevelNumber);
}
