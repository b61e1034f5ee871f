#![forbid(unsafe_code)]

pub mod app_services;
pub mod controller;
pub mod error;
pub mod levels;
pub mod render;

pub use app_services::{AppServices, LevelLocation};
pub use controller::{ControllerState, Intent, LoadTicket, QuizController};
pub use error::{AppServicesError, ControllerError, LevelLoadError};
pub use levels::{
    DirectoryLevelSource, HttpLevelSource, LevelLoader, LevelSource, StaticLevelSource,
};
pub use render::{QuestionView, Renderer, ResultView, SummaryView};
