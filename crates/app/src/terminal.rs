//! Line-oriented front end: prints what the controller renders and turns
//! typed commands into controller intents.

use std::fmt;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use quiz_core::model::{LevelNumber, Player, PlayerError};
use quiz_core::{Feedback, Performance, QuizSession};
use services::{
    ControllerError, ControllerState, QuestionView, QuizController, Renderer, ResultView,
    SummaryView,
};

//
// ─── RENDERER ──────────────────────────────────────────────────────────────────
//

pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn notice(&mut self, message: impl fmt::Display) {
        self.line(format_args!("{message}"));
    }

    fn line(&mut self, text: fmt::Arguments<'_>) {
        if let Err(err) = writeln!(self.out, "{text}") {
            warn!(%err, "failed to write to terminal");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn name_prompt(&mut self, rejected: Option<&PlayerError>) {
        if let Some(err) = rejected {
            self.line(format_args!("{err}."));
        }
        self.line(format_args!("What is your name?"));
    }

    fn welcome_back(&mut self, player: &Player) {
        self.line(format_args!("Welcome back, {}!", player.name()));
        self.line(format_args!(
            "[c] continue where you left off  [r] restart from the beginning"
        ));
    }

    fn loading(&mut self, level: LevelNumber) {
        self.line(format_args!("Loading level {level}..."));
    }

    fn summary(&mut self, view: &SummaryView<'_>) {
        self.line(format_args!("\n== Level {}: {} ==", view.level, view.title));
        self.line(format_args!("{}", view.text));
        self.line(format_args!("[b] begin"));
    }

    fn question(&mut self, view: &QuestionView<'_>) {
        self.line(format_args!(
            "\n[{}/{}] {}",
            view.index + 1,
            view.total,
            view.text
        ));
        for (i, option) in view.options.iter().enumerate() {
            let marker = if view.selected == Some(i) { '*' } else { ' ' };
            self.line(format_args!(" {marker}{}) {option}", i + 1));
        }
        if view.can_advance() {
            self.line(format_args!("[n] next  [s] save and exit"));
        } else {
            self.line(format_args!("Pick an option (1-{}).", view.options.len()));
        }
    }

    fn result(&mut self, view: &ResultView) {
        let result = &view.result;
        let who = view.player_name.as_deref().unwrap_or("You");
        self.line(format_args!(
            "\n{who} scored {}/{} ({:.0}%) on level {}.",
            result.score, result.total, result.percent, result.level
        ));
        self.line(format_args!("{}", feedback_text(result.feedback)));
        self.line(format_args!(
            "Levels completed: {}  Average: {:.1}%{}",
            view.progress.levels_completed,
            view.progress.average_or_zero(),
            view.performance
                .map(|p| format!("  ({})", performance_text(p)))
                .unwrap_or_default()
        ));

        if view.campaign_complete {
            self.line(format_args!("You finished the final level! [o] start over"));
        } else if view.next_level_available {
            self.line(format_args!("[l] next level  [r] restart level"));
        } else {
            self.line(format_args!("[r] restart level"));
        }
    }

    fn load_error(&mut self, level: LevelNumber) {
        self.line(format_args!(
            "Level {level} could not be loaded. [retry] try again  [r] restart level"
        ));
    }

    fn volunteer_prompt(&mut self) {
        self.line(format_args!(
            "Great score! Consider helping others learn as a volunteer."
        ));
    }

    fn progress_saved(&mut self, level: LevelNumber) {
        self.line(format_args!(
            "Progress on level {level} saved. Come back any time."
        ));
    }
}

fn feedback_text(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Mastered => "Outstanding! You have mastered this level.",
        Feedback::Passed => "Well done, you passed.",
        Feedback::KeepPracticing => "Not quite. Review the material and try again.",
    }
}

fn performance_text(performance: Performance) -> &'static str {
    match performance {
        Performance::Excellent => "excellent",
        Performance::Solid => "solid",
        Performance::KeepLearning => "keep learning",
    }
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 1-based option number as typed.
    Choose(usize),
    Next,
    Begin,
    Restart,
    Save,
    Reset,
    NextLevel,
    Retry,
    Continue,
    StartOver,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        let input = raw.trim().to_ascii_lowercase();
        if let Ok(number) = input.parse::<usize>() {
            if number > 0 {
                return Self::Choose(number);
            }
        }
        match input.as_str() {
            "n" | "next" => Self::Next,
            "b" | "begin" => Self::Begin,
            "r" | "restart" => Self::Restart,
            "s" | "save" => Self::Save,
            "reset" => Self::Reset,
            "l" | "next level" => Self::NextLevel,
            "retry" => Self::Retry,
            "c" | "continue" => Self::Continue,
            "o" | "start over" => Self::StartOver,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" => Self::Quit,
            _ => Self::Unknown(raw.trim().to_owned()),
        }
    }
}

const HELP: &str = "\
Commands:
  1..n          pick an option
  n, next       next question
  b, begin      start the level after its summary
  c, continue   continue a saved game
  r, restart    restart the level (or the campaign, when welcomed back)
  l, next level move on after passing
  retry         retry a level that failed to load
  o, start over begin again after the final level
  s, save       save and exit
  reset         erase all progress, including your name
  q, quit       leave (answers are already saved)";

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

/// Drive `controller` from `input` until the player quits, saves, or input ends.
///
/// # Errors
///
/// Returns the first storage failure, or an I/O error reading input.
pub async fn run<I, W>(
    controller: &mut QuizController<TerminalRenderer<W>>,
    input: I,
) -> Result<(), Box<dyn std::error::Error>>
where
    I: AsyncBufRead + Unpin,
    W: Write,
{
    controller.boot().await?;

    let mut lines = input.lines();
    let mut confirming_reset = false;

    while let Some(line) = lines.next_line().await? {
        if confirming_reset {
            confirming_reset = false;
            let confirmed = line.trim().eq_ignore_ascii_case("yes");
            let outcome = controller.reset_all(confirmed).await;
            report(controller, outcome)?;
            continue;
        }

        if matches!(controller.state(), ControllerState::NamePrompt) {
            if Command::parse(&line) == Command::Quit {
                break;
            }
            let outcome = controller.submit_name(&line).await;
            report(controller, outcome)?;
            continue;
        }

        let outcome = match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => {
                controller.renderer_mut().notice(HELP);
                Ok(())
            }
            Command::Reset => {
                confirming_reset = true;
                controller
                    .renderer_mut()
                    .notice("Type 'yes' to erase all progress, including your name.");
                Ok(())
            }
            Command::Unknown(raw) => {
                controller
                    .renderer_mut()
                    .notice(format_args!("Unknown command '{raw}'. Type 'help' for a list."));
                Ok(())
            }
            command => dispatch(controller, command).await,
        };
        report(controller, outcome)?;

        if matches!(controller.state(), ControllerState::Saved) {
            break;
        }
    }

    Ok(())
}

async fn dispatch<R: Renderer>(
    controller: &mut QuizController<R>,
    command: Command,
) -> Result<(), ControllerError> {
    match command {
        Command::Choose(number) => {
            let index = controller.session().map_or(0, QuizSession::current_index);
            controller.select_answer(index, number - 1).await
        }
        Command::Next => controller.next().await,
        Command::Begin => controller.begin_level(),
        Command::Restart => {
            if matches!(controller.state(), ControllerState::WelcomeBack) {
                controller.restart_from_beginning().await
            } else {
                controller.restart_level().await
            }
        }
        Command::Save => controller.save_and_exit().await,
        Command::NextLevel => controller.next_level().await,
        Command::Retry => controller.retry().await,
        Command::Continue => controller.continue_session().await,
        Command::StartOver => controller.start_over().await,
        Command::Reset | Command::Help | Command::Quit | Command::Unknown(_) => Ok(()),
    }
}

/// Show recoverable errors to the player; storage failures end the run.
fn report<W: Write>(
    controller: &mut QuizController<TerminalRenderer<W>>,
    outcome: Result<(), ControllerError>,
) -> Result<(), ControllerError> {
    match outcome {
        Ok(()) => Ok(()),
        Err(err @ ControllerError::Storage(_)) => Err(err),
        // Already re-prompted by the renderer.
        Err(ControllerError::InvalidName(_)) => Ok(()),
        Err(ControllerError::ResetNotConfirmed) => {
            controller.renderer_mut().notice("Reset cancelled.");
            Ok(())
        }
        Err(err) => {
            controller.renderer_mut().notice(err);
            Ok(())
        }
    }
}
