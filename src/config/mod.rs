use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{FeedwatchError, FeedwatchResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_MAX_REDIRECTS: usize = 1;
const DEFAULT_USER_AGENT: &str = concat!("feedwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub output_dir: PathBuf,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Width of the worker pool used by concurrent batches.
    pub concurrency: usize,
    pub max_redirect_hops: usize,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Load configuration from the environment.
    ///
    /// `db_override` comes from the command line and wins over `FEEDWATCH_DB_PATH`.
    pub fn from_env(db_override: Option<String>) -> FeedwatchResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // Default db_path is relative to executable directory
        let db_path = db_override
            .or_else(|| std::env::var("FEEDWATCH_DB_PATH").ok())
            .unwrap_or_else(|| {
                exe_dir
                    .as_ref()
                    .map(|d| d.join("feedwatch.db").to_string_lossy().into_owned())
                    .unwrap_or_else(|| "./feedwatch.db".to_string())
            });

        let output_dir = std::env::var("FEEDWATCH_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("feedwatch"));

        let timeout_secs = parse_var("FEEDWATCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let concurrency = parse_var("FEEDWATCH_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        if concurrency == 0 {
            return Err(FeedwatchError::Config(
                "FEEDWATCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        let max_redirect_hops = parse_var("FEEDWATCH_MAX_REDIRECTS", DEFAULT_MAX_REDIRECTS)?;

        let user_agent = std::env::var("FEEDWATCH_USER_AGENT")
            .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        Ok(Self {
            db_path,
            output_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            user_agent,
            concurrency,
            max_redirect_hops,
        })
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> FeedwatchResult<T> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            FeedwatchError::Config(format!("{} has an invalid value: {}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}
