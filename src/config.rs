//! Runtime configuration.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `BISTRO_DATA` | snapshot file path | `bistro.json` |
//! | `BISTRO_BUCKETS` | buckets for order listings | `10` |
//! | `BISTRO_LOG` | log filter (see [`crate::logging`]) | `info` |

use std::path::PathBuf;

use crate::sort::DEFAULT_BUCKET_COUNT;

pub const ENV_DATA_PATH: &str = "BISTRO_DATA";
pub const ENV_BUCKET_COUNT: &str = "BISTRO_BUCKETS";

/// Default snapshot file
pub const DEFAULT_DATA_PATH: &str = "bistro.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot file
    pub data_path: PathBuf,

    /// Buckets used by the distribution sort
    pub bucket_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from any variable lookup.
    ///
    /// Unset variables take their default. A bucket count that is not a
    /// positive integer is ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_PATH).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_BUCKET_COUNT) {
            match raw.trim().parse::<usize>() {
                Ok(count) if count > 0 => config.bucket_count = count,
                _ => tracing::warn!(
                    value = %raw,
                    default = DEFAULT_BUCKET_COUNT,
                    "ignoring invalid {}", ENV_BUCKET_COUNT
                ),
            }
        }

        config
    }
}
