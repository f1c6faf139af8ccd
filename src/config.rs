use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::query::DEFAULT_TOP_K;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the four positional CSV tables.
    pub data_dir: PathBuf,
    pub default_top_k: NonZeroUsize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            default_top_k: DEFAULT_TOP_K,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read `SCOUT_DATA_DIR`, `SCOUT_TOP_K` and `SCOUT_LOG`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_blank("SCOUT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let default_top_k = non_blank("SCOUT_TOP_K")
            .and_then(|v| v.trim().parse::<NonZeroUsize>().ok())
            .unwrap_or(defaults.default_top_k);
        let log_filter = non_blank("SCOUT_LOG").unwrap_or(defaults.log_filter);

        Self {
            data_dir,
            default_top_k,
            log_filter,
        }
    }
}

/// Install the stderr `tracing` subscriber; `RUST_LOG` wins over the config.
pub fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
