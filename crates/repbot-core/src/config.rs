//! Bot configuration.
//!
//! Loaded from a TOML file, then overridden from `REPBOT_*` environment
//! variables, then validated. Every value is pass-through for the core
//! except `reject_policy`, which changes how rejected tasks are settled.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SUCCESS_REPLY: &str = "Thanks for your input! Your vote has been accounted for.";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// What to do with the source item of a rejected task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectPolicy {
    /// Leave it unprocessed: it is fetched and rejected again next cycle.
    #[default]
    Retry,
    /// Mark it processed after the error reply, so it is rejected once.
    Settle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// The one community this process moderates.
    pub community: String,

    #[serde(default = "default_bot_username")]
    pub bot_username: String,

    #[serde(default)]
    pub label_css_class: String,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    #[serde(default = "default_success_reply")]
    pub success_reply: String,

    #[serde(default)]
    pub reject_policy: RejectPolicy,
}

fn default_bot_username() -> String {
    "repbot".to_string()
}

fn default_interval_secs() -> u64 {
    30
}

fn default_fetch_limit() -> usize {
    2
}

fn default_success_reply() -> String {
    DEFAULT_SUCCESS_REPLY.to_string()
}

impl BotConfig {
    /// Defaults for everything but the community.
    pub fn new(community: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            bot_username: default_bot_username(),
            label_css_class: String::new(),
            interval_secs: default_interval_secs(),
            fetch_limit: default_fetch_limit(),
            success_reply: default_success_reply(),
            reject_policy: RejectPolicy::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// File (if given), then environment, then validation.
    ///
    /// Without a file, `REPBOT_COMMUNITY` must be set.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::new(String::new()),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REPBOT_*` overrides using `lookup` to read variables.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("REPBOT_COMMUNITY") {
            self.community = v;
        }
        if let Some(v) = lookup("REPBOT_BOT_USERNAME") {
            self.bot_username = v;
        }
        if let Some(v) = lookup("REPBOT_LABEL_CSS_CLASS") {
            self.label_css_class = v;
        }
        if let Some(v) = lookup("REPBOT_INTERVAL_SECS") {
            self.interval_secs = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("interval_secs", format!("{v:?}: {e}")))?;
        }
        if let Some(v) = lookup("REPBOT_FETCH_LIMIT") {
            self.fetch_limit = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("fetch_limit", format!("{v:?}: {e}")))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.community.trim().is_empty() {
            return Err(ConfigError::invalid("community", "must not be empty"));
        }
        if self.bot_username.trim().is_empty() {
            return Err(ConfigError::invalid("bot_username", "must not be empty"));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::invalid("interval_secs", "must be greater than 0"));
        }
        if self.fetch_limit == 0 {
            return Err(ConfigError::invalid("fetch_limit", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
