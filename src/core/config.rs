//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - Gemini model selection
//! - Study tip length
//! - Data directory override

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{EduQuestError, Result};

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "EDUQUEST_DATA_DIR";

/// Available Gemini models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GeminiModel {
    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Gemini 2.5 Flash (default)
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,
    /// Gemini 3 Flash Preview
    #[serde(rename = "gemini-3-flash-preview")]
    Gemini3FlashPreview,
}

impl GeminiModel {
    /// Get the API model identifier
    pub fn api_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini20Flash => "gemini-2.0-flash",
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini3FlashPreview => "gemini-3-flash-preview",
        }
    }

    /// Get a human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini20Flash => "Gemini 2.0 Flash",
            GeminiModel::Gemini25Flash => "Gemini 2.5 Flash",
            GeminiModel::Gemini3FlashPreview => "Gemini 3 Flash Preview",
        }
    }

    /// Parse from an API model identifier
    pub fn from_api_name(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.api_name() == s)
    }

    /// Get all available models
    pub fn all() -> &'static [GeminiModel] {
        &[
            GeminiModel::Gemini20Flash,
            GeminiModel::Gemini25Flash,
            GeminiModel::Gemini3FlashPreview,
        ]
    }

    /// The model after this one, wrapping around
    pub fn next(&self) -> Self {
        let models = Self::all();
        let idx = models.iter().position(|m| m == self).unwrap_or(0);
        models[(idx + 1) % models.len()]
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected Gemini model for study tips
    #[serde(default)]
    pub gemini_model: GeminiModel,

    /// Character budget requested for each study tip
    #[serde(default = "default_tip_max_chars")]
    pub tip_max_chars: u32,

    /// Where progress and catalog files live (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_tip_max_chars() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_model: GeminiModel::default(),
            tip_max_chars: default_tip_max_chars(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Resolve the data directory.
    ///
    /// Priority: explicit override > `EDUQUEST_DATA_DIR` > config file > platform default
    pub fn data_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = explicit {
            return Ok(dir);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Set the Gemini model
    pub fn set_gemini_model(&mut self, model: GeminiModel) {
        self.gemini_model = model;
    }

    /// Set the tip length, rejecting budgets too small to be useful
    pub fn set_tip_max_chars(&mut self, chars: u32) -> Result<()> {
        if !(20..=500).contains(&chars) {
            return Err(EduQuestError::InvalidInput(
                "Tip length must be between 20 and 500 characters".to_string(),
            ));
        }
        self.tip_max_chars = chars;
        Ok(())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "eduquest", "eduquest")
        .ok_or_else(|| EduQuestError::Config("Could not determine config directory".into()))
}
