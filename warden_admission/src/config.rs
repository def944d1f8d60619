//! Configuration of the connection gate

use warden_enforcement::DenialLayout;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Message shown to players refused because their lookup could not complete
pub const DEFAULT_UNAVAILABLE_MESSAGE: &str =
    "Unable to verify your connection. Please try again later.";

/// What to do when a punishment lookup fails or times out. There is no
/// implied default here; [`GateConfig`] chooses one explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Treat the lookup as having found nothing
    FailOpen,
    /// Refuse the connection with this message
    FailClosed { message: String },
}

impl FailurePolicy {
    pub fn fail_closed() -> Self {
        Self::FailClosed {
            message: DEFAULT_UNAVAILABLE_MESSAGE.to_string(),
        }
    }
}

fn default_failure_policy() -> FailurePolicy {
    FailurePolicy::fail_closed()
}

fn default_lookup_timeout() -> u64 {
    5
}

fn default_attempt_timeout() -> u64 {
    120
}

fn default_reap_interval() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GateConfig {
    #[serde(default = "default_failure_policy")]
    pub failure_policy: FailurePolicy,
    /// How long a single punishment lookup may take before it counts as failed
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
    /// How long an attempt may sit between its two phases before it is reaped
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,
    /// How often the gate's reaper runs
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
    #[serde(default)]
    pub denial_template: Option<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            failure_policy: default_failure_policy(),
            lookup_timeout_secs: default_lookup_timeout(),
            attempt_timeout_secs: default_attempt_timeout(),
            reap_interval_secs: default_reap_interval(),
            denial_template: None,
        }
    }
}

/// Errors that could happen when loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {1}: {0}")]
    IoError(std::io::Error, PathBuf),
    #[error("Parse error in {1}: {0}")]
    ParseError(json5::Error, PathBuf),
}

impl GateConfig {
    /// Load the gate configuration from a given file path
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        let filename = filename.as_ref();
        let contents =
            fs::read_to_string(filename).map_err(|e| ConfigError::IoError(e, filename.to_owned()))?;
        json5::from_str(&contents).map_err(|e| ConfigError::ParseError(e, filename.to_owned()))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// At least one second, as `tokio::time::interval` rejects zero
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.max(1))
    }

    pub fn denial_layout(&self) -> DenialLayout {
        match &self.denial_template {
            Some(template) => DenialLayout::new(template.as_str()),
            None => DenialLayout::default(),
        }
    }
}
