#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod scoring;
pub mod session;

pub use progress::{ProgressSummary, summarize};
pub use scoring::{Feedback, LevelOutcome, Performance, ScoringError, ScoringPolicy};
pub use session::{Advance, LevelResult, QuizSession, SessionError, SessionPhase};
