use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use quiz_core::model::{ContinuePolicy, Level, LevelNumber, Player, QuizConfig};
use quiz_core::{Advance, LevelResult, QuizSession, SessionPhase, summarize};
use storage::ProgressStore;

use crate::error::{ControllerError, LevelLoadError};
use crate::levels::{LevelLoader, LevelSource};
use crate::render::{QuestionView, Renderer, ResultView, SummaryView};

//
// ─── INTENTS & STATE ───────────────────────────────────────────────────────────
//

/// User-facing actions, used to report which one was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Boot,
    SubmitName,
    Continue,
    RestartFromBeginning,
    StartLevel,
    Begin,
    SelectAnswer,
    Next,
    NextLevel,
    RestartLevel,
    Retry,
    SaveAndExit,
    ResetAll,
    StartOver,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Boot => "boot",
            Self::SubmitName => "submit name",
            Self::Continue => "continue",
            Self::RestartFromBeginning => "restart from beginning",
            Self::StartLevel => "start level",
            Self::Begin => "begin level",
            Self::SelectAnswer => "select answer",
            Self::Next => "next question",
            Self::NextLevel => "next level",
            Self::RestartLevel => "restart level",
            Self::Retry => "retry",
            Self::SaveAndExit => "save and exit",
            Self::ResetAll => "reset all",
            Self::StartOver => "start over",
        };
        f.write_str(label)
    }
}

/// Identifies one level request. Only the latest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    level: LevelNumber,
    resume: bool,
    generation: u64,
}

impl LoadTicket {
    #[must_use]
    pub fn level(&self) -> LevelNumber {
        self.level
    }

    #[must_use]
    pub fn resume(&self) -> bool {
        self.resume
    }
}

#[derive(Debug)]
pub enum ControllerState {
    Idle,
    NamePrompt,
    WelcomeBack,
    Loading(LoadTicket),
    LoadError { level: LevelNumber, resume: bool },
    Playing(QuizSession),
    Saved,
}

impl ControllerState {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::NamePrompt => "waiting for a name",
            Self::WelcomeBack => "offering continue or restart",
            Self::Loading(_) => "loading a level",
            Self::LoadError { .. } => "showing a load error",
            Self::Playing(_) => "playing a level",
            Self::Saved => "progress is saved",
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Single owner of the quiz: boots the player, drives the level session,
/// persists after every mutation and notifies the renderer.
///
/// Every method finishes its writes before it returns, so the renderer never
/// observes a state that is not yet saved.
pub struct QuizController<R> {
    config: QuizConfig,
    progress: ProgressStore,
    loader: LevelLoader,
    renderer: R,
    player: Option<Player>,
    state: ControllerState,
    generation: u64,
}

impl<R: Renderer> QuizController<R> {
    #[must_use]
    pub fn new(
        config: QuizConfig,
        progress: ProgressStore,
        source: Arc<dyn LevelSource>,
        renderer: R,
    ) -> Self {
        let loader = LevelLoader::new(source, progress.clone());
        Self {
            config,
            progress,
            loader,
            renderer,
            player: None,
            state: ControllerState::Idle,
            generation: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.state {
            ControllerState::Playing(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Read the saved player and show either the name prompt or the
    /// welcome-back choice.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Unavailable` unless freshly constructed, or
    /// `ControllerError::Storage` if the player cannot be read.
    pub async fn boot(&mut self) -> Result<(), ControllerError> {
        if !matches!(self.state, ControllerState::Idle) {
            return Err(self.unavailable(Intent::Boot));
        }

        match self.progress.player().await? {
            Some(player) => {
                info!(player = player.name(), "returning player");
                self.state = ControllerState::WelcomeBack;
                self.renderer.welcome_back(&player);
                self.player = Some(player);
            }
            None => {
                self.state = ControllerState::NamePrompt;
                self.renderer.name_prompt(None);
            }
        }
        Ok(())
    }

    /// Accept a name and start the saved level fresh.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::InvalidName` after re-prompting if the name is
    /// too short; the state does not change.
    pub async fn submit_name(&mut self, raw: &str) -> Result<(), ControllerError> {
        if !matches!(self.state, ControllerState::NamePrompt) {
            return Err(self.unavailable(Intent::SubmitName));
        }

        let player = match Player::new(raw) {
            Ok(player) => player,
            Err(err) => {
                debug!(%err, "name rejected");
                self.renderer.name_prompt(Some(&err));
                return Err(err.into());
            }
        };

        self.progress.save_player(&player).await?;
        info!(player = player.name(), "new player");
        self.player = Some(player);

        let level = self.progress.current_level().await?;
        self.start_level(level, false).await
    }

    /// Returning player chose Continue.
    ///
    /// Resumes mid-level or restarts the saved level depending on the
    /// configured [`ContinuePolicy`].
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if not at the welcome-back choice or storage fails.
    pub async fn continue_session(&mut self) -> Result<(), ControllerError> {
        if !matches!(self.state, ControllerState::WelcomeBack) {
            return Err(self.unavailable(Intent::Continue));
        }

        let level = self.progress.current_level().await?;
        let resume = self.config.continue_policy() == ContinuePolicy::Resume;
        self.start_level(level, resume).await
    }

    /// Returning player chose Restart from beginning: every persisted key is
    /// cleared, the current player is saved again, and level 1 starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if not at the welcome-back choice or storage fails.
    pub async fn restart_from_beginning(&mut self) -> Result<(), ControllerError> {
        if !matches!(self.state, ControllerState::WelcomeBack) {
            return Err(self.unavailable(Intent::RestartFromBeginning));
        }

        self.progress.clear_all().await?;
        if let Some(player) = &self.player {
            self.progress.save_player(player).await?;
        }
        info!("restarting campaign from level 1");
        self.start_level(LevelNumber::FIRST, false).await
    }

    /// Load `level` and open a session on it.
    ///
    /// With `resume`, saved position and answers are restored and the summary
    /// is skipped; otherwise the level's saved position is cleared first.
    /// A failed load leaves the controller in `LoadError`.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if the progress is already saved or storage fails.
    pub async fn start_level(
        &mut self,
        level: LevelNumber,
        resume: bool,
    ) -> Result<(), ControllerError> {
        let ticket = self.request_level(level, resume).await?;
        let loaded = self.loader.load(level).await;
        self.complete_load(ticket, loaded).await
    }

    /// First half of [`Self::start_level`]: record the request and enter
    /// `Loading`. Any earlier ticket becomes stale.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if the progress is already saved or storage fails.
    pub async fn request_level(
        &mut self,
        level: LevelNumber,
        resume: bool,
    ) -> Result<LoadTicket, ControllerError> {
        if matches!(self.state, ControllerState::Saved) {
            return Err(self.unavailable(Intent::StartLevel));
        }

        if !resume {
            self.progress.clear_resume(level).await?;
        }
        self.progress.set_current_level(level).await?;

        self.generation += 1;
        let ticket = LoadTicket {
            level,
            resume,
            generation: self.generation,
        };
        debug!(%level, resume, generation = ticket.generation, "requesting level");
        self.state = ControllerState::Loading(ticket);
        self.renderer.loading(level);
        Ok(ticket)
    }

    /// Second half of [`Self::start_level`]. Results for a ticket that is no
    /// longer current are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Storage` if saved progress cannot be read; the
    /// controller is then in `LoadError`.
    pub async fn complete_load(
        &mut self,
        ticket: LoadTicket,
        loaded: Result<Level, LevelLoadError>,
    ) -> Result<(), ControllerError> {
        if !matches!(&self.state, ControllerState::Loading(current) if *current == ticket) {
            debug!(
                level = %ticket.level,
                generation = ticket.generation,
                "discarding stale level response"
            );
            return Ok(());
        }

        let level = match loaded {
            Ok(level) => level,
            Err(err) => {
                warn!(level = %ticket.level, %err, "level load failed");
                self.enter_load_error(ticket);
                return Ok(());
            }
        };

        match self.build_session(level, ticket.resume).await {
            Ok(session) => {
                info!(
                    level = %ticket.level,
                    question = session.current_index(),
                    total = session.total(),
                    "level ready"
                );
                self.state = ControllerState::Playing(session);
                self.render_session();
                Ok(())
            }
            Err(err) => {
                warn!(level = %ticket.level, %err, "could not open level");
                self.enter_load_error(ticket);
                Err(err)
            }
        }
    }

    /// Leave the level summary and show the first question.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` unless a summary is showing.
    pub fn begin_level(&mut self) -> Result<(), ControllerError> {
        self.session_mut(Intent::Begin)?.begin()?;
        self.render_session();
        Ok(())
    }

    /// Pick an option on the current question and persist it immediately.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if no question is showing, the question is not
    /// current, the option does not exist, or storage fails.
    pub async fn select_answer(
        &mut self,
        question_index: usize,
        option_index: usize,
    ) -> Result<(), ControllerError> {
        let session = self.session_mut(Intent::SelectAnswer)?;
        session.select_answer(question_index, option_index)?;
        let snapshot = session.resume_state();
        self.progress.save_resume(&snapshot).await?;
        self.render_session();
        Ok(())
    }

    /// Score the current question and move to the next one, finishing the
    /// level after the last.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Session` if the current question is
    /// unanswered, or `ControllerError::Storage` if persisting fails.
    pub async fn next(&mut self) -> Result<(), ControllerError> {
        let session = self.session_mut(Intent::Next)?;
        match session.advance()? {
            Advance::Next { .. } => {
                let snapshot = session.resume_state();
                self.progress.save_resume(&snapshot).await?;
                self.render_session();
                Ok(())
            }
            Advance::Finished(result) => self.finish(result).await,
        }
    }

    /// Move on after passing a level that is not the last.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Unavailable` unless the level is finished,
    /// passed and not the final level.
    pub async fn next_level(&mut self) -> Result<(), ControllerError> {
        let Some((level, passed)) = self
            .session()
            .and_then(QuizSession::result)
            .map(|result| (result.level, result.passed()))
        else {
            return Err(self.unavailable(Intent::NextLevel));
        };
        if !passed || self.config.is_last_level(level) {
            return Err(self.unavailable(Intent::NextLevel));
        }

        let next = level.next();
        self.progress.set_current_level(next).await?;
        info!(from = %level, to = %next, "advancing to next level");
        self.start_level(next, false).await
    }

    /// Start the current level over from its summary. Also retries a failed load.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if no level is active or storage fails.
    pub async fn restart_level(&mut self) -> Result<(), ControllerError> {
        let level = match &self.state {
            ControllerState::Playing(session) => session.level_number(),
            ControllerState::LoadError { level, .. } => *level,
            _ => return Err(self.unavailable(Intent::RestartLevel)),
        };
        info!(%level, "restarting level");
        self.start_level(level, false).await
    }

    /// Repeat the failed load with the same level and resume flag.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Unavailable` unless a load error is showing.
    pub async fn retry(&mut self) -> Result<(), ControllerError> {
        let ControllerState::LoadError { level, resume } = self.state else {
            return Err(self.unavailable(Intent::Retry));
        };
        self.start_level(level, resume).await
    }

    /// Persist the in-progress level and end the session.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if no level is active or storage fails.
    pub async fn save_and_exit(&mut self) -> Result<(), ControllerError> {
        let level = match &self.state {
            ControllerState::Playing(session) => {
                if !session.is_finished() {
                    self.progress.save_resume(&session.resume_state()).await?;
                }
                session.level_number()
            }
            _ => return Err(self.unavailable(Intent::SaveAndExit)),
        };

        info!(%level, "progress saved");
        self.state = ControllerState::Saved;
        self.renderer.progress_saved(level);
        Ok(())
    }

    /// Wipe every saved key, including the player's name, and return to the
    /// name prompt.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::ResetNotConfirmed` without `confirmed`.
    pub async fn reset_all(&mut self, confirmed: bool) -> Result<(), ControllerError> {
        if matches!(
            self.state,
            ControllerState::Saved | ControllerState::Loading(_)
        ) {
            return Err(self.unavailable(Intent::ResetAll));
        }
        if !confirmed {
            return Err(ControllerError::ResetNotConfirmed);
        }

        self.progress.clear_all().await?;
        info!("all progress cleared");
        self.player = None;
        self.state = ControllerState::NamePrompt;
        self.renderer.name_prompt(None);
        Ok(())
    }

    /// After finishing the final level: clear progress (keeping the name)
    /// and start again at level 1.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Unavailable` unless the final level is finished.
    pub async fn start_over(&mut self) -> Result<(), ControllerError> {
        let finished_last = self
            .session()
            .and_then(QuizSession::result)
            .is_some_and(|result| self.config.is_last_level(result.level));
        if !finished_last {
            return Err(self.unavailable(Intent::StartOver));
        }

        self.progress.clear_progress().await?;
        info!("campaign complete; starting over");
        self.start_level(LevelNumber::FIRST, false).await
    }

    async fn build_session(
        &self,
        level: Level,
        resume: bool,
    ) -> Result<QuizSession, ControllerError> {
        let scoring = self.config.scoring();
        if resume {
            if let Some(saved) = self.progress.resume_state(level.number()).await? {
                match QuizSession::resume(level.clone(), scoring, &saved) {
                    Ok(session) => return Ok(session),
                    Err(err) => warn!(%err, "saved progress discarded"),
                }
            }
        }

        let mut session = QuizSession::start(level, scoring);
        if resume && *session.phase() == SessionPhase::Summary {
            session.begin()?;
        }
        Ok(session)
    }

    async fn finish(&mut self, result: LevelResult) -> Result<(), ControllerError> {
        let history = self
            .progress
            .record_score(result.level, result.percent)
            .await?;
        self.progress.clear_resume(result.level).await?;

        let progress = summarize(&history);
        let performance = progress
            .average_percent
            .map(|average| self.config.scoring().performance(average));
        let campaign_complete = self.config.is_last_level(result.level);
        let next_level_available = result.passed() && !campaign_complete;
        let volunteer = result.volunteer_eligible;

        info!(
            level = %result.level,
            score = result.score,
            total = result.total,
            percent = result.percent,
            passed = result.passed(),
            "level finished"
        );

        let view = ResultView {
            player_name: self.player.as_ref().map(|p| p.name().to_owned()),
            result,
            progress,
            performance,
            next_level_available,
            campaign_complete,
        };
        self.renderer.result(&view);
        if volunteer {
            self.renderer.volunteer_prompt();
        }
        Ok(())
    }

    fn enter_load_error(&mut self, ticket: LoadTicket) {
        self.state = ControllerState::LoadError {
            level: ticket.level,
            resume: ticket.resume,
        };
        self.renderer.load_error(ticket.level);
    }

    fn render_session(&mut self) {
        let ControllerState::Playing(session) = &self.state else {
            return;
        };
        let level = session.level();

        match session.phase() {
            SessionPhase::Summary => {
                if let Some(text) = level.summary() {
                    self.renderer.summary(&SummaryView {
                        level: level.number(),
                        title: level.title(),
                        text,
                    });
                }
            }
            SessionPhase::Answering => {
                if let Some(question) = session.current_question() {
                    self.renderer.question(&QuestionView::new(
                        level.number(),
                        level.title(),
                        session.current_index(),
                        session.total(),
                        question,
                    ));
                }
            }
            SessionPhase::Finished(_) => {}
        }
    }

    fn session_mut(&mut self, intent: Intent) -> Result<&mut QuizSession, ControllerError> {
        match &mut self.state {
            ControllerState::Playing(session) => Ok(session),
            other => Err(ControllerError::Unavailable {
                intent,
                state: other.name(),
            }),
        }
    }

    fn unavailable(&self, intent: Intent) -> ControllerError {
        debug!(%intent, state = self.state.name(), "intent ignored");
        ControllerError::Unavailable {
            intent,
            state: self.state.name(),
        }
    }
}

impl<R> fmt::Debug for QuizController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizController")
            .field("config", &self.config)
            .field("player", &self.player)
            .field("state", &self.state.name())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
