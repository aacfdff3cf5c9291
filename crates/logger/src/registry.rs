//! Logger registry
//!
//! An explicit object owned by the caller - nothing process-wide. The
//! registry builds one rotating sink per configured logger, tracks a
//! default logger for call sites that don't care which one they use, and
//! tears everything down on `shutdown`.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use lumber_sinks::{
    AsyncSink, Compressor, Lz4Compressor, NoopCompressor, RecordSink, RotatingFileSinkMt,
    WorkerConfig,
};

use crate::config::{Compression, LoggerConfig, RegistryConfig};
use crate::error::Result;
use crate::level::Level;
use crate::logger::Logger;

struct Entry {
    logger: Arc<Logger>,
    path: PathBuf,
}

/// Name-keyed collection of loggers sharing one lifecycle
pub struct Registry {
    loggers: DashMap<String, Entry>,
    default: RwLock<Option<Arc<Logger>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            loggers: DashMap::new(),
            default: RwLock::new(None),
        }
    }

    /// Build a registry from configuration
    ///
    /// Loggers are registered in name order so the implicit default (the
    /// first registration) is deterministic.
    pub fn init(config: RegistryConfig) -> Result<Self> {
        let registry = Self::new();
        let mut names: Vec<&String> = config.loggers.keys().collect();
        names.sort();
        for name in names {
            registry.register(name, config.loggers[name].clone())?;
        }
        Ok(registry)
    }

    /// Register one logger
    ///
    /// The first registration of a name wins; registering it again
    /// returns the existing logger untouched. The first logger ever
    /// registered becomes the default until `set_default` says otherwise.
    pub fn register(&self, name: &str, config: LoggerConfig) -> Result<Arc<Logger>> {
        if let Some(entry) = self.loggers.get(name) {
            return Ok(Arc::clone(&entry.logger));
        }

        config.validate(name)?;
        let policy = config.rotation_policy()?;
        let path = PathBuf::from(&config.path);
        let compressor: Box<dyn Compressor> = match config.compression {
            Compression::Lz4 => Box::new(Lz4Compressor),
            Compression::None => Box::new(NoopCompressor),
        };
        let rotating = Arc::new(RotatingFileSinkMt::with_compressor(&path, policy, compressor)?);

        let sink: Arc<dyn RecordSink> = if config.queue_size > 0 {
            Arc::new(AsyncSink::spawn(
                rotating,
                WorkerConfig {
                    queue_size: config.queue_size,
                    flush_interval: config.flush_interval(),
                },
            )?)
        } else {
            rotating
        };

        let logger = Arc::new(Logger::new(name, config.level, vec![sink]));

        // first registration wins, even when racing
        let entry = self.loggers.entry(name.to_string()).or_insert(Entry {
            logger: Arc::clone(&logger),
            path,
        });
        let logger = Arc::clone(&entry.logger);
        drop(entry);

        let mut default = self.default.write();
        if default.is_none() {
            *default = Some(Arc::clone(&logger));
        }

        Ok(logger)
    }

    /// Look a logger up by name
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).map(|entry| Arc::clone(&entry.logger))
    }

    /// The default logger, if any logger is registered
    pub fn default_logger(&self) -> Option<Arc<Logger>> {
        self.default.read().clone()
    }

    /// Make a registered logger the default; false if the name is unknown
    pub fn set_default(&self, name: &str) -> bool {
        match self.get(name) {
            Some(logger) => {
                *self.default.write() = Some(logger);
                true
            }
            None => false,
        }
    }

    /// Change a logger's level; false if the name is unknown
    pub fn set_level(&self, name: &str, level: Level) -> bool {
        match self.get(name) {
            Some(logger) => {
                logger.set_level(level);
                true
            }
            None => false,
        }
    }

    /// Flush one logger; false if the name is unknown
    pub fn flush(&self, name: &str) -> bool {
        match self.get(name) {
            Some(logger) => {
                logger.flush();
                true
            }
            None => false,
        }
    }

    /// Flush every registered logger
    pub fn flush_all(&self) {
        for entry in self.loggers.iter() {
            entry.logger.flush();
        }
    }

    /// Active-file path of a logger's rotating sink
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.loggers.get(name).map(|entry| entry.path.clone())
    }

    /// Number of registered loggers
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Whether no logger is registered
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Flush everything and tear the registry down
    ///
    /// Writer threads drain and join as their sinks drop. Loggers still
    /// held by callers keep their own sinks alive until those clones go.
    pub fn shutdown(self) {
        self.flush_all();
        *self.default.write() = None;
        self.loggers.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
