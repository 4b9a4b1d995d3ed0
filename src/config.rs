//! Daemon configuration.
//!
//! Resolved in order of precedence (highest wins):
//!
//! 1. **Environment variables**: `REMOTES_HARDWARE` (`1`/`true`/`yes`
//!    enables GPIO), `REMOTES_STORE` (record file path)
//! 2. **Config file**: TOML, path via `--config <path>`
//! 3. **Compiled defaults**: see [`RemotesConfig::default`]
//!
//! ```toml
//! hardware_enabled = true
//! store_path = "/var/lib/remotes/remotes.json"
//! poll_interval_ms = 1000
//! log_level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemotesConfig {
    /// Drive real GPIO.  Off means debug mode: no driver call is made.
    pub hardware_enabled: bool,
    /// JSON record file.
    pub store_path: PathBuf,
    /// Output pass interval (milliseconds).
    pub poll_interval_ms: u64,
    /// `log` level filter, overridden by `RUST_LOG`.
    pub log_level: String,
}

impl Default for RemotesConfig {
    fn default() -> Self {
        Self {
            hardware_enabled: false,
            store_path: PathBuf::from("remotes.json"),
            poll_interval_ms: 1000,
            log_level: "info".to_owned(),
        }
    }
}

impl RemotesConfig {
    /// Load `path` (or defaults when `None`), apply environment overrides,
    /// and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides from `lookup` (the process environment in
    /// production).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("REMOTES_HARDWARE") {
            self.hardware_enabled = matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(v) = lookup("REMOTES_STORE") {
            if !v.trim().is_empty() {
                self.store_path = PathBuf::from(v);
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(100..=60_000).contains(&self.poll_interval_ms) {
            return Err(Error::Config("poll_interval_ms must be 100–60000".to_owned()));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(Error::Config("store_path must not be empty".to_owned()));
        }
        Ok(())
    }
}
