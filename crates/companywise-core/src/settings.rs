use clap::{CommandFactory, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CompanywiseError;
use crate::filters::{SortSpec, StatusFilter};
use crate::models::{Difficulty, Timeframe};
use crate::persist::write_json_atomic;

/// Default dataset location, a sibling checkout of the company-wise CSV repo.
pub const DEFAULT_DATA_DIR: &str = "../leetcode-companywise-interview-questions";

/// Default location of the generated document.
pub const DEFAULT_OUTPUT: &str = "public/data.json";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Company-wise LeetCode question dataset builder and browser
#[derive(Parser, Debug, Clone)]
#[command(
    name = "companywise",
    about = "Company-wise LeetCode question dataset builder and browser",
    version
)]
pub struct Settings {
    /// Dataset root containing one directory per company
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Path of the generated JSON document
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Directory for local state (defaults to ~/.companywise)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Directory holding per-user solved-status documents
    #[arg(long)]
    pub remote_dir: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Parse the dataset and write the consolidated document
    Build {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List companies with per-timeframe counts
    Companies {
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,

        /// Timeframe key
        #[arg(long, default_value = "all")]
        timeframe: Timeframe,

        /// Show solved progress for this user id
        #[arg(long)]
        user: Option<String>,
    },

    /// List one company's questions
    Questions {
        /// Company slug or directory name
        company: String,

        /// Timeframe key
        #[arg(long, default_value = "all")]
        timeframe: Timeframe,

        /// Keep only these difficulties (repeatable; default: all)
        #[arg(long = "difficulty", value_parser = parse_difficulty)]
        difficulties: Vec<Difficulty>,

        /// all, solved or unsolved
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Case-insensitive title or id filter
        #[arg(long, default_value = "")]
        search: String,

        /// Sort order, e.g. frequency-desc, title-asc
        #[arg(long, default_value = "frequency-desc")]
        sort: SortSpec,

        /// Mark solved questions for this user id
        #[arg(long)]
        user: Option<String>,
    },

    /// Track solved questions for a user
    Solved {
        /// User id
        #[arg(long)]
        user: String,

        /// Email stored alongside the solved list
        #[arg(long)]
        email: Option<String>,

        #[command(subcommand)]
        action: SolvedAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SolvedAction {
    /// Flip the solved state of a question
    Toggle { id: i64 },
    /// Print the solved question ids
    List,
}

/// `--difficulty` goes through the case-insensitive `FromStr`, which rejects
/// unknown names. Clap would otherwise pick the lenient `From<String>`.
fn parse_difficulty(raw: &str) -> Result<Difficulty, CompanywiseError> {
    raw.parse()
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `<state dir>/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the config path inside `state_dir`.
    pub fn config_path_in(state_dir: &Path) -> PathBuf {
        state_dir.join("last_used.json")
    }

    /// Read `path`; a missing or unparsable file yields empty params.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        write_json_atomic(path, self, true).map(|_| ())
    }

    /// Remove `path`. Already absent is fine.
    pub fn clear_at(path: &Path) -> std::io::Result<()> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// `~/.companywise`, or `./.companywise` when the home directory is unknown.
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".companywise")
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(std::env::args_os().collect(), &default_state_dir())
    }

    /// Full implementation. `default_state` is used when `--state-dir` is not
    /// given, so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        default_state: &Path,
    ) -> Self {
        // Raw matches are only needed for `value_source`.
        let matches = Settings::command().get_matches_from(args.clone());

        let mut settings = Settings::parse_from(args);
        if settings.state_dir.is_none() {
            settings.state_dir = Some(default_state.to_path_buf());
        }
        let config_path = LastUsedParams::config_path_in(&settings.state_dir());

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(&config_path) {
                tracing::warn!(path = %config_path.display(), "could not clear last-used params: {e}");
            }
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(&config_path);

        let on_cli = |id: &str| is_arg_explicitly_set(&matches, id);
        match last.data_dir {
            Some(dir) if !on_cli("data_dir") => settings.data_dir = dir,
            _ => {}
        }
        match last.output {
            Some(path) if !on_cli("output") => settings.output = path,
            _ => {}
        }
        if settings.remote_dir.is_none() {
            settings.remote_dir = last.remote_dir;
        }

        settings = Self::apply_debug_flag(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(&config_path) {
            tracing::debug!(path = %config_path.display(), "last-used params not saved: {e}");
        }

        settings
    }

    /// Resolved local state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Directory acting as the remote solved-status store.
    pub fn remote_dir(&self) -> PathBuf {
        self.remote_dir
            .clone()
            .unwrap_or_else(|| self.state_dir().join("remote"))
    }

    /// `--debug` overrides log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            data_dir: Some(s.data_dir.clone()),
            output: Some(s.output.clone()),
            remote_dir: s.remote_dir.clone(),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
