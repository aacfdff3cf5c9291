//! Log levels
//!
//! Five severities with a total order; a logger drops records below its
//! configured level before any formatting happens.

use serde::Deserialize;

/// Record severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Debugging detail
    Debug = 0,
    /// Normal operation (default)
    #[default]
    Info = 1,
    /// Something surprising but survivable
    Warn = 2,
    /// An operation failed
    Error = 3,
    /// Failure demanding attention; also used by elapsed-time reports
    Critical = 4,
}

impl Level {
    /// Lowercase name, matching the configuration spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }

    /// Single-letter tag used in the record format
    pub fn tag(&self) -> char {
        match self {
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
            Self::Critical => 'C',
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Debug,
            1 => Self::Info,
            2 => Self::Warn,
            3 => Self::Error,
            _ => Self::Critical,
        }
    }
}
