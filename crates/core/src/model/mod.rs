mod config;
mod history;
mod ids;
mod level;
mod player;
mod question;
mod resume;

pub use config::{ConfigError, ContinuePolicy, QuizConfig};
pub use history::ScoreHistory;
pub use ids::{LevelNumber, LevelNumberError};
pub use level::{Level, LevelError};
pub use player::{MIN_NAME_CHARS, Player, PlayerError};
pub use question::{MIN_OPTIONS, Question, QuestionError};
pub use resume::ResumeState;
