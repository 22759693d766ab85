//! Logging utilities
//!
//! Provides logging configuration and helpers.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// Filter directives for this crate and the HTTP trace layer
    pub fn directives(self) -> String {
        let level = self.to_tracing_level().as_str().to_lowercase();
        format!("portainer_gateway={level},tower_http={level}")
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

/// Initialize the logger with specified level
pub fn init_logger(level: LogLevel) {
    let filter = EnvFilter::new(level.directives());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("unknown".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_directives() {
        assert_eq!(
            LogLevel::Debug.directives(),
            "portainer_gateway=debug,tower_http=debug"
        );
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
