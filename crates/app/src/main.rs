use std::fmt;

use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quiz_core::model::{ContinuePolicy, QuizConfig};
use services::{AppServices, LevelLocation};

mod terminal;

use terminal::TerminalRenderer;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTotalLevels { raw: String },
    InvalidContinuePolicy { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTotalLevels { raw } => {
                write!(f, "invalid --total-levels value: {raw}")
            }
            ArgsError::InvalidContinuePolicy { raw } => {
                write!(f, "invalid --continue value: {raw} (expected resume or restart)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  quiz [--db <sqlite_url>] [--levels <dir|url>] [--total-levels <n>] [--continue resume|restart]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --levels levels");
    eprintln!("  --total-levels {}", QuizConfig::DEFAULT_TOTAL_LEVELS);
    eprintln!("  --continue resume");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_LEVELS, QUIZ_TOTAL_LEVELS, QUIZ_CONTINUE, RUST_LOG");
}

#[derive(Debug)]
struct Args {
    db_url: String,
    levels: LevelLocation,
    config: QuizConfig,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut levels = std::env::var("QUIZ_LEVELS").unwrap_or_else(|_| "levels".into());
        let mut total_levels = std::env::var("QUIZ_TOTAL_LEVELS").ok();
        let mut continue_policy = std::env::var("QUIZ_CONTINUE").ok();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--levels" => levels = require_value(args, "--levels")?,
                "--total-levels" => total_levels = Some(require_value(args, "--total-levels")?),
                "--continue" => continue_policy = Some(require_value(args, "--continue")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let mut config = QuizConfig::default();
        if let Some(raw) = total_levels {
            config = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|n| config.clone().with_total_levels(n).ok())
                .ok_or(ArgsError::InvalidTotalLevels { raw })?;
        }
        if let Some(raw) = continue_policy {
            let policy: ContinuePolicy = raw
                .parse()
                .map_err(|_| ArgsError::InvalidContinuePolicy { raw: raw.clone() })?;
            config = config.with_continue_policy(policy);
        }

        let Ok(levels) = levels.parse::<LevelLocation>();

        Ok(Self {
            db_url,
            levels,
            config,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, &parsed.levels).await?;
    info!(
        db = %parsed.db_url,
        levels = %parsed.levels,
        total_levels = parsed.config.total_levels(),
        continue_policy = %parsed.config.continue_policy(),
        "starting quiz"
    );

    let mut controller =
        services.controller(parsed.config, TerminalRenderer::new(std::io::stdout()));
    terminal::run(&mut controller, BufReader::new(tokio::io::stdin())).await
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
