//! User settings and where they live on disk.
//!
//! Settings are loaded once at startup and written back after every
//! successful settings command. The file is plain JSON, and any field missing
//! from it falls back to its default.

use crate::error::{Result, TicketTalkError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an assistant who helps users of Jira with \
questions they have regarding Jira Tickets. Do not answer questions which are not related to \
tickets; say `Sorry, I cannot answer that question. I can only answer questions regarding Jira \
Tickets.'";

/// Mutable chat settings plus the tracker connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model_name: String,
    /// Retained exchange pairs, not messages.
    pub history_length: usize,
    pub temperature: f32,
    pub max_output_tokens: usize,
    pub system_prompt: String,
    pub tracker: TrackerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o".to_string(),
            history_length: 10,
            temperature: 0.3,
            max_output_tokens: 1000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tracker: TrackerSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub base_url: String,
    pub username: String,
    pub api_token: String,
}

impl TrackerSettings {
    /// Check that the tracker can be reached at all.
    ///
    /// The base URL must be an absolute URL; token and username must be set.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(TicketTalkError::ConfigError(
                "Tracker base URL is not configured".to_string(),
            ));
        }

        reqwest::Url::parse(self.base_url.trim()).map_err(|e| {
            TicketTalkError::ConfigError(format!(
                "Tracker base URL '{}' is not a valid absolute URL: {}",
                self.base_url, e
            ))
        })?;

        if self.api_token.trim().is_empty() {
            return Err(TicketTalkError::ConfigError(
                "Tracker API token is not configured".to_string(),
            ));
        }

        if self.username.trim().is_empty() {
            return Err(TicketTalkError::ConfigError(
                "Tracker username is not configured".to_string(),
            ));
        }

        Ok(())
    }
}

/// Source and sink for persisted settings.
pub trait ConfigStore {
    fn load(&self) -> Result<Settings>;

    fn persist(&self, settings: &Settings) -> Result<()>;

    /// Where the settings live, for display.
    fn location(&self) -> String;
}

/// Settings stored as pretty-printed JSON in a single file.
pub struct JsonFileConfigStore {
    path: PathBuf,
}

impl JsonFileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/ticket-talk/configuration.json`.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            TicketTalkError::ConfigError("Cannot find config directory".to_string())
        })?;

        Ok(Self::new(config_dir.join("ticket-talk").join("configuration.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileConfigStore {
    /// Read the settings file, creating it with defaults when it does not exist yet.
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No settings file, writing defaults");
            let settings = Settings::default();
            self.persist(&settings)?;
            return Ok(settings);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings = serde_json::from_str(&content).map_err(|e| {
            TicketTalkError::ConfigError(format!(
                "Failed to parse settings at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), "Loaded settings");
        Ok(settings)
    }

    fn persist(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;

        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
