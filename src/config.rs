use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bindings::RollbackPolicy;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api/v1";
const DEFAULT_CONFIG_FILE: &str = "cfish.toml";

impl std::str::FromStr for RollbackPolicy {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "restore" | "rollback" => Ok(RollbackPolicy::Restore),
            "keep" | "keep-patched" | "none" => Ok(RollbackPolicy::KeepPatched),
            _ => Err(anyhow!(
                "Invalid rollback policy '{s}'. Valid options: restore, keep"
            )),
        }
    }
}

impl std::fmt::Display for RollbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RollbackPolicy::Restore => write!(f, "restore"),
            RollbackPolicy::KeepPatched => write!(f, "keep"),
        }
    }
}

/// Connection and storage options shared by every `cfish` command.
///
/// Configuration priority: CLI args > Environment variables > config file > Defaults
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to a TOML config file (defaults to ./cfish.toml when present)
    #[arg(long, global = true, env = "CFISH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the CFISH REST API
    #[arg(long, global = true, env = "CFISH_API_URL")]
    pub api_url: Option<String>,

    /// Per-request timeout in milliseconds (1000-600000); unset means no timeout
    #[arg(long, global = true, env = "CFISH_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// File holding the persisted access/refresh tokens
    #[arg(long, global = true, env = "CFISH_SESSION_PATH")]
    pub session_path: Option<PathBuf>,

    /// SQLite database for local search history
    #[arg(long, global = true, env = "CFISH_HISTORY_DB")]
    pub history_db_path: Option<PathBuf>,

    /// What to do with an optimistic patch when the server rejects it: restore or keep
    #[arg(long, global = true, env = "CFISH_ROLLBACK", value_parser = clap::value_parser!(RollbackPolicy))]
    pub rollback: Option<RollbackPolicy>,

    /// Page size for listing calls (1-100)
    #[arg(long, global = true, env = "CFISH_PER_PAGE")]
    pub per_page: Option<u32>,
}

/// Optional `cfish.toml` layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub session_path: Option<PathBuf>,
    pub history_db_path: Option<PathBuf>,
    pub rollback: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_ms: Option<u64>,
    pub session_path: PathBuf,
    pub history_db_path: PathBuf,
    pub rollback: RollbackPolicy,
    pub per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: None,
            session_path: default_data_dir().join("session.json"),
            history_db_path: default_data_dir().join("search_history.db"),
            rollback: RollbackPolicy::default(),
            per_page: 10,
        }
    }
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

fn default_data_dir() -> PathBuf {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".cfish"))
        .unwrap_or_else(|| PathBuf::from(".cfish"))
}

/// Read a TOML config file.
pub fn read_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Load configuration from CLI args (which already carry env fallbacks) and
/// the optional config file.
pub fn load(args: CliArgs) -> Result<Config> {
    let file = match &args.config {
        Some(path) => Some(read_file(path)?),
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                Some(read_file(implicit)?)
            } else {
                None
            }
        }
    };
    resolve(args, file.unwrap_or_default())
}

/// Merge the layers. Priority: args > file > defaults.
pub fn resolve(args: CliArgs, file: FileConfig) -> Result<Config> {
    let defaults = Config::default();

    let api_url = args
        .api_url
        .or(file.api_url)
        .unwrap_or(defaults.api_url)
        .trim_end_matches('/')
        .to_string();
    validate_url(&api_url, "CFISH_API_URL")?;

    let request_timeout_ms = match args.request_timeout_ms.or(file.request_timeout_ms) {
        Some(ms) => Some(validate_in_range(
            ms,
            1000,
            600_000,
            "CFISH_REQUEST_TIMEOUT_MS",
        )?),
        None => None,
    };

    let rollback = match args.rollback {
        Some(p) => p,
        None => match file.rollback {
            Some(s) => s.parse()?,
            None => defaults.rollback,
        },
    };

    let per_page = args.per_page.or(file.per_page).unwrap_or(defaults.per_page);
    let per_page = validate_in_range(per_page, 1, 100, "CFISH_PER_PAGE")?;

    Ok(Config {
        api_url,
        request_timeout_ms,
        session_path: args
            .session_path
            .or(file.session_path)
            .unwrap_or(defaults.session_path),
        history_db_path: args
            .history_db_path
            .or(file.history_db_path)
            .unwrap_or(defaults.history_db_path),
        rollback,
        per_page,
    })
}

impl Config {
    pub fn print_summary(&self) {
        eprintln!("CFISH Client Configuration:");
        eprintln!("  API URL: {}", self.api_url);
        match self.request_timeout_ms {
            Some(ms) => eprintln!("  Request Timeout: {ms}ms"),
            None => eprintln!("  Request Timeout: none"),
        }
        eprintln!("  Session File: {}", self.session_path.display());
        eprintln!("  Search History: {}", self.history_db_path.display());
        eprintln!("  Rollback Policy: {}", self.rollback);
        eprintln!("  Page Size: {}", self.per_page);
    }
}
