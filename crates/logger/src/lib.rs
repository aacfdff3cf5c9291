//! Lumber - Logger
//!
//! Named loggers over rotating file sinks. A [`Registry`] owns the
//! name-to-logger mapping and the sinks' lifecycle; each [`Logger`]
//! filters by level, formats records into the standard line format, and
//! fans out to its sinks. Nothing here is process-global - callers own
//! the registry and shut it down explicitly.
//!
//! # Example
//!
//! ```no_run
//! use lumber_logger::{LoggerConfig, Registry, Stopwatch};
//!
//! let registry = Registry::new();
//! let app = registry.register("app", LoggerConfig::with_path("logs/app.log"))?;
//!
//! app.info("service starting");
//! app.warn("config file missing, using defaults");
//!
//! {
//!     let _watch = Stopwatch::with_label(app.clone(), "warm-up");
//!     // ... work measured and reported on drop ...
//! }
//!
//! registry.shutdown();
//! # Ok::<(), lumber_logger::RegistryError>(())
//! ```

/// Registry configuration (TOML)
pub mod config;

/// Registry error types
mod error;

/// Record formatting
pub mod format;

/// Log levels
mod level;

/// The named logger
mod logger;

/// The logger registry
mod registry;

/// Scoped elapsed-time reporting
mod stopwatch;

pub use config::{Compression, LoggerConfig, RegistryConfig};
pub use error::{RegistryError, Result};
pub use level::Level;
pub use logger::Logger;
pub use registry::Registry;
pub use stopwatch::Stopwatch;
