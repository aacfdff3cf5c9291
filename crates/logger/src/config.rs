//! Registry configuration
//!
//! TOML-based with defaults that just work - a logger only needs a path.
//!
//! ```toml
//! [loggers.app]
//! path = "logs/app.log"
//!
//! [loggers.net]
//! path = "logs/net.log"
//! level = "debug"
//! max_size = 1048576
//! max_rotated_files = 3
//! max_archives = 2
//! queue_size = 0          # synchronous writes
//! ```

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use lumber_sinks::{RotationPolicy, MAX_ROTATED_FILES_LIMIT};

use crate::error::{RegistryError, Result};
use crate::level::Level;

/// Default size bound for the active file (200 MB)
pub const DEFAULT_MAX_SIZE: u64 = 200 * 1024 * 1024;

/// Default retained rotated files
pub const DEFAULT_MAX_ROTATED_FILES: usize = 1;

/// Default retained archives
pub const DEFAULT_MAX_ARCHIVES: usize = 1;

/// Default bound on the background queue
pub const DEFAULT_QUEUE_SIZE: usize = 8192;

/// Default periodic flush interval in milliseconds
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 100;

/// Configuration for a whole registry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Named logger instances
    pub loggers: HashMap<String, LoggerConfig>,
}

impl FromStr for RegistryConfig {
    type Err = RegistryError;

    fn from_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Archive compression selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// LZ4 frame compression (default)
    #[default]
    Lz4,
    /// Stage archives as plain copies
    None,
}

/// Configuration for a single logger
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Base path of the active log file (required)
    pub path: String,

    /// Level threshold
    pub level: Level,

    /// Size bound of the active file in bytes
    pub max_size: u64,

    /// Retained rotated files
    pub max_rotated_files: usize,

    /// Retained compressed archives (0 disables archiving)
    pub max_archives: usize,

    /// Rotate at startup when the file is already non-empty
    pub rotate_on_open: bool,

    /// Records buffered between producers and the writer thread;
    /// 0 writes synchronously on the calling thread
    pub queue_size: usize,

    /// Periodic flush interval for the writer thread
    pub flush_interval_ms: u64,

    /// Archive compression
    pub compression: Compression,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            level: Level::Info,
            max_size: DEFAULT_MAX_SIZE,
            max_rotated_files: DEFAULT_MAX_ROTATED_FILES,
            max_archives: DEFAULT_MAX_ARCHIVES,
            rotate_on_open: false,
            queue_size: DEFAULT_QUEUE_SIZE,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            compression: Compression::Lz4,
        }
    }
}

impl LoggerConfig {
    /// Minimal configuration: everything default but the path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Reject unusable values, naming the logger in the error
    pub fn validate(&self, logger: &str) -> Result<()> {
        if self.path.is_empty() {
            return Err(RegistryError::invalid_value(
                logger,
                "path",
                "must not be empty",
            ));
        }
        if self.max_size == 0 {
            return Err(RegistryError::invalid_value(
                logger,
                "max_size",
                "must be greater than zero",
            ));
        }
        if self.max_rotated_files > MAX_ROTATED_FILES_LIMIT {
            return Err(RegistryError::invalid_value(
                logger,
                "max_rotated_files",
                format!("must not exceed {MAX_ROTATED_FILES_LIMIT}"),
            ));
        }
        Ok(())
    }

    /// Build the sink-level policy
    pub fn rotation_policy(&self) -> Result<RotationPolicy> {
        let policy = RotationPolicy::new(self.max_size, self.max_rotated_files, self.max_archives)?;
        Ok(if self.rotate_on_open {
            policy.rotate_on_open()
        } else {
            policy
        })
    }

    /// Periodic flush interval as a duration
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}
