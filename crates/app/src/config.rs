use std::fmt;
use std::path::{Path, PathBuf};

use quiz_core::model::SetId;
use quiz_core::scoring::{LevelUpCondition, RewardPolicy};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSetId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidLevelUpXp { raw: String },
    InvalidCurrency { raw: String },
    MissingSet,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSetId { raw } => write!(f, "invalid --set value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLevelUpXp { raw } => {
                write!(f, "invalid level-up XP (expected a positive integer): {raw}")
            }
            ArgsError::InvalidCurrency { raw } => {
                write!(f, "invalid currency per level: {raw}")
            }
            ArgsError::MissingSet => write!(f, "quiz requires --set <id>"),
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

fn parse_level_up(raw: &str) -> Result<LevelUpCondition, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|xp| LevelUpCondition::new(xp).ok())
        .ok_or_else(|| ArgsError::InvalidLevelUpXp {
            raw: raw.to_string(),
        })
}

fn parse_currency(raw: &str) -> Result<u64, ArgsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ArgsError::InvalidCurrency {
            raw: raw.to_string(),
        })
}

/// Runtime settings. Flags override `QUIZ_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub policy: RewardPolicy,
    pub set_id: Option<SetId>,
    pub verbose: bool,
}

impl Config {
    pub fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = normalize_sqlite_url(
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into()),
        );
        let mut condition = match std::env::var("QUIZ_LEVEL_UP_XP") {
            Ok(raw) => parse_level_up(&raw)?,
            Err(_) => LevelUpCondition::default(),
        };
        let mut currency = match std::env::var("QUIZ_CURRENCY_PER_LEVEL") {
            Ok(raw) => parse_currency(&raw)?,
            Err(_) => RewardPolicy::DEFAULT_CURRENCY_PER_LEVEL,
        };
        let mut set_id = None;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--set" => {
                    let value = require_value(args, "--set")?;
                    let parsed = value
                        .parse::<SetId>()
                        .map_err(|_| ArgsError::InvalidSetId { raw: value.clone() })?;
                    set_id = Some(parsed);
                }
                "--level-up-xp" => {
                    condition = parse_level_up(&require_value(args, "--level-up-xp")?)?;
                }
                "--currency-per-level" => {
                    currency = parse_currency(&require_value(args, "--currency-per-level")?)?;
                }
                "--verbose" | "-v" => verbose = true,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            policy: RewardPolicy::new(condition, currency),
            set_id,
            verbose,
        })
    }

    pub fn require_set(&self) -> Result<SetId, ArgsError> {
        self.set_id.ok_or(ArgsError::MissingSet)
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file (and its directory) exists before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    let path = Path::new(path);
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
