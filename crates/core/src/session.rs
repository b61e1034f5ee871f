//! Per-level quiz state machine.
//!
//! `Summary -> Answering -> ... -> Finished`. The session never touches
//! storage; callers persist [`QuizSession::resume_state`] after each mutation.

use std::fmt;

use thiserror::Error;

use crate::model::{Level, LevelNumber, Question, QuestionError, ResumeState};
use crate::scoring::{self, Feedback, LevelOutcome, ScoringPolicy};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("the level summary must be acknowledged first")]
    SummaryPending,

    #[error("the level summary is not showing")]
    NotInSummary,

    #[error("level {0} is already finished")]
    Finished(LevelNumber),

    #[error("question {requested} is not the current question ({current})")]
    NotCurrentQuestion { requested: usize, current: usize },

    #[error("the current question has no selected answer")]
    NoSelection,

    #[error("saved progress does not fit level {level}")]
    StaleResume { level: LevelNumber },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of a finished level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelResult {
    pub level: LevelNumber,
    pub score: usize,
    pub total: usize,
    pub percent: f64,
    pub outcome: LevelOutcome,
    pub feedback: Feedback,
    /// Advisory only; never gates progression.
    pub volunteer_eligible: bool,
}

impl LevelResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == LevelOutcome::Passed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Summary,
    Answering,
    Finished(LevelResult),
}

/// What happened on [`QuizSession::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next { index: usize },
    Finished(LevelResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One player's progress through a single loaded level.
///
/// Invariant: `score <= current <= level.total()`, and `current == total`
/// only in the `Finished` phase.
pub struct QuizSession {
    level: Level,
    scoring: ScoringPolicy,
    current: usize,
    score: usize,
    phase: SessionPhase,
}

impl QuizSession {
    /// Start a level from its first question, discarding any pre-filled picks.
    ///
    /// Levels with a summary open in the `Summary` phase.
    #[must_use]
    pub fn start(mut level: Level, scoring: ScoringPolicy) -> Self {
        level.clear_selections();
        let phase = if level.summary().is_some() {
            SessionPhase::Summary
        } else {
            SessionPhase::Answering
        };

        Self {
            level,
            scoring,
            current: 0,
            score: 0,
            phase,
        }
    }

    /// Continue a level mid-way. The summary is skipped.
    ///
    /// `level` is expected to already carry the saved picks.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::StaleResume` if `state` belongs to another level,
    /// points past the last question, or claims more points than answers.
    pub fn resume(
        level: Level,
        scoring: ScoringPolicy,
        state: &ResumeState,
    ) -> Result<Self, SessionError> {
        let fits = state.level == level.number()
            && state.question_index < level.total()
            && state.score <= state.question_index;
        if !fits {
            return Err(SessionError::StaleResume {
                level: level.number(),
            });
        }

        Ok(Self {
            level,
            scoring,
            current: state.question_index,
            score: state.score,
            phase: SessionPhase::Answering,
        })
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn level_number(&self) -> LevelNumber {
        self.level.number()
    }

    #[must_use]
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.level.total()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&LevelResult> {
        match &self.phase {
            SessionPhase::Finished(result) => Some(result),
            _ => None,
        }
    }

    /// The question being answered, if the session is in `Answering`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::Answering => self.level.question(self.current),
            _ => None,
        }
    }

    /// Leave the summary and show the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInSummary` outside the `Summary` phase.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Summary {
            return Err(SessionError::NotInSummary);
        }
        self.phase = SessionPhase::Answering;
        Ok(())
    }

    /// Pick an option on the current question. Re-picking overwrites.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session is not answering, `question_index`
    /// is not the current question, or the option does not exist.
    pub fn select_answer(
        &mut self,
        question_index: usize,
        option_index: usize,
    ) -> Result<(), SessionError> {
        self.ensure_answering()?;
        if question_index != self.current {
            return Err(SessionError::NotCurrentQuestion {
                requested: question_index,
                current: self.current,
            });
        }
        let current = self.current;
        let number = self.level.number();
        let question = self
            .level
            .question_mut(current)
            .ok_or(SessionError::Finished(number))?;
        question.select(option_index)?;
        Ok(())
    }

    /// Score the current question and move on.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSelection` if the current question is unanswered,
    /// or a phase error outside `Answering`.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        self.ensure_answering()?;
        let question = self
            .level
            .question(self.current)
            .ok_or(SessionError::Finished(self.level.number()))?;
        if !question.is_answered() {
            return Err(SessionError::NoSelection);
        }
        if question.is_correct() {
            self.score += 1;
        }
        self.current += 1;

        if self.current < self.level.total() {
            return Ok(Advance::Next {
                index: self.current,
            });
        }

        let result = self.finish();
        self.phase = SessionPhase::Finished(result.clone());
        Ok(Advance::Finished(result))
    }

    /// Snapshot for persistence.
    #[must_use]
    pub fn resume_state(&self) -> ResumeState {
        ResumeState {
            level: self.level.number(),
            question_index: self.current,
            score: self.score,
            selections: self.level.selections(),
        }
    }

    fn finish(&self) -> LevelResult {
        let total = self.level.total();
        let percent = scoring::percent(self.score, total);
        LevelResult {
            level: self.level.number(),
            score: self.score,
            total,
            percent,
            outcome: self.scoring.outcome(percent),
            feedback: self.scoring.feedback(percent),
            volunteer_eligible: self.scoring.volunteer_eligible(percent),
        }
    }

    fn ensure_answering(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Answering => Ok(()),
            SessionPhase::Summary => Err(SessionError::SummaryPending),
            SessionPhase::Finished(_) => Err(SessionError::Finished(self.level.number())),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("level", &self.level.number())
            .field("questions_len", &self.level.total())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
