//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, GeminiModel};
use crate::core::credentials::{CredentialStore, Secret};
use crate::error::{EduQuestError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
    }
}

/// Handle setting a configuration value
fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    match key {
        ConfigKey::GeminiKey => {
            CredentialStore::store(Secret::GeminiKey, &value)?;
            println!("Gemini API key has been stored securely.");
        }
        ConfigKey::GeminiModel => {
            let model = GeminiModel::from_api_name(&value).ok_or_else(|| {
                EduQuestError::InvalidInput(format!(
                    "Invalid model '{}'. Available models: {}",
                    value,
                    GeminiModel::all()
                        .iter()
                        .map(|m| m.api_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;

            let mut config = Config::load()?;
            config.set_gemini_model(model);
            config.save()?;

            println!("Gemini model set to: {}", model.display_name());
        }
        ConfigKey::AdminPassword => {
            if value.chars().count() < 4 {
                return Err(EduQuestError::InvalidInput(
                    "Teacher password must be at least 4 characters".to_string(),
                ));
            }
            CredentialStore::store(Secret::AdminPassword, &value)?;
            println!("Teacher password has been stored securely.");
        }
        ConfigKey::TipLength => {
            let chars: u32 = value.trim().parse().map_err(|_| {
                EduQuestError::InvalidInput(format!("'{}' is not a number", value))
            })?;

            let mut config = Config::load()?;
            config.set_tip_max_chars(chars)?;
            config.save()?;

            println!("Study tips limited to {} characters.", chars);
        }
    }
    Ok(())
}

/// Handle getting a configuration value
fn handle_get(key: ConfigKey) -> Result<()> {
    match key {
        ConfigKey::GeminiKey => {
            if let Some(key) = CredentialStore::get(Secret::GeminiKey)? {
                println!("Gemini API key: {}", CredentialStore::mask_token(&key));
            } else {
                println!("Gemini API key: Not configured");
            }
        }
        ConfigKey::GeminiModel => {
            let config = Config::load()?;
            println!(
                "Gemini model: {} ({})",
                config.gemini_model.display_name(),
                config.gemini_model.api_name()
            );
        }
        ConfigKey::AdminPassword => {
            let status = if CredentialStore::has(Secret::AdminPassword)? {
                "Configured"
            } else {
                "Not configured"
            };
            println!("Teacher password: {}", status);
        }
        ConfigKey::TipLength => {
            let config = Config::load()?;
            println!("Tip length: {} characters", config.tip_max_chars);
        }
    }
    Ok(())
}

/// Handle removing a configuration value
fn handle_remove(key: ConfigKey) -> Result<()> {
    match key {
        ConfigKey::GeminiKey => {
            CredentialStore::delete(Secret::GeminiKey)?;
            println!("Gemini API key has been removed.");
        }
        ConfigKey::GeminiModel => {
            let mut config = Config::load()?;
            config.set_gemini_model(GeminiModel::default());
            config.save()?;
            println!(
                "Gemini model reset to default: {}",
                GeminiModel::default().display_name()
            );
        }
        ConfigKey::AdminPassword => {
            CredentialStore::delete(Secret::AdminPassword)?;
            println!("Teacher password has been removed. Teacher mode is now locked.");
        }
        ConfigKey::TipLength => {
            let mut config = Config::load()?;
            config.tip_max_chars = Config::default().tip_max_chars;
            config.save()?;
            println!("Tip length reset to default: {} characters", config.tip_max_chars);
        }
    }
    Ok(())
}
