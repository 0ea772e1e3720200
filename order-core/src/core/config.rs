use std::path::{Path, PathBuf};

/// Engine configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/orders | Working directory for the line store |
/// | LOG_LEVEL | info | trace, debug, info, warn or error |
/// | LOG_DIR | (unset) | Directory for rolling log files |
/// | ENVIRONMENT | development | development, staging or production |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the order line store
    pub work_dir: String,
    /// Log verbosity
    pub log_level: String,
    /// Optional directory for daily-rolling log files
    pub log_dir: Option<String>,
    /// Running environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/orders".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the working directory
    ///
    /// Mostly used by tests pointing the store at a temp directory.
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// Path of the order line store database file
    pub fn store_path(&self) -> PathBuf {
        Path::new(&self.work_dir).join("orders.redb")
    }

    /// True in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// True in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
