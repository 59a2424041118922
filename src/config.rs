//! Application configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `STRATAOPTIMA_*` environment variables (e.g. `STRATAOPTIMA_IO_THREADS=8`)
//! 3. CLI flags, applied by the caller
//!
//! No configuration file is read.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::{DEFAULT_BATCH_SIZE, DEFAULT_IO_THREADS};
use crate::scanner::{HashAlgorithm, DEFAULT_BUFFER_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "STRATAOPTIMA_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest algorithm for duplicate detection.
    pub algorithm: HashAlgorithm,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Files per hashing batch.
    pub batch_size: usize,
    /// Read buffer size in bytes.
    pub buffer_size: usize,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            io_threads: DEFAULT_IO_THREADS,
            batch_size: DEFAULT_BATCH_SIZE,
            buffer_size: DEFAULT_BUFFER_SIZE,
            skip_hidden: false,
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// The layered provider: defaults merged with the environment.
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the configuration, falling back to defaults if it is invalid.
    #[must_use]
    pub fn load() -> Self {
        Self::from_figment(&Self::figment())
    }

    /// Extract from a provider, falling back to defaults if it is invalid.
    #[must_use]
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract::<Config>() {
            Ok(config) => config.sanitized(),
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp counts and sizes to at least 1.
    #[must_use]
    fn sanitized(mut self) -> Self {
        self.io_threads = self.io_threads.max(1);
        self.batch_size = self.batch_size.max(1);
        self.buffer_size = self.buffer_size.max(1);
        self
    }
}
