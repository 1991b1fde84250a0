//! Secure credential storage using the system keyring
//!
//! This module handles secure storage of sensitive values:
//! - Gemini API key (study tips)
//! - Teacher password (unlocks catalog editing)
//!
//! Uses the system keyring (macOS Keychain, Linux Secret Service) with
//! in-memory caching to minimize keychain prompts.
//!
//! ## Environment Variable Fallback
//!
//! For scripted use and CI, credentials can be set via environment variables:
//! - `GEMINI_API_KEY` - Gemini API key
//! - `EDUQUEST_ADMIN_PASSWORD` - teacher password
//!
//! Priority: env var > cache > keyring

use std::sync::RwLock;

use keyring::Entry;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{EduQuestError, Result};

const SERVICE_NAME: &str = "eduquest";

/// A secret managed by the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
    GeminiKey,
    AdminPassword,
}

impl Secret {
    fn keyring_name(&self) -> &'static str {
        match self {
            Secret::GeminiKey => "gemini_api_key",
            Secret::AdminPassword => "admin_password",
        }
    }

    /// Environment variable that overrides the keyring
    pub fn env_var(&self) -> &'static str {
        match self {
            Secret::GeminiKey => "GEMINI_API_KEY",
            Secret::AdminPassword => "EDUQUEST_ADMIN_PASSWORD",
        }
    }

    fn cache(&self) -> &'static Lazy<RwLock<Option<Option<SecretString>>>> {
        match self {
            Secret::GeminiKey => &GEMINI_KEY_CACHE,
            Secret::AdminPassword => &ADMIN_PASSWORD_CACHE,
        }
    }
}

// In-memory credential cache
// Option<Option<T>>:
//   - None = not yet fetched from keyring
//   - Some(None) = fetched, but no credential exists
//   - Some(Some(value)) = fetched and cached
static GEMINI_KEY_CACHE: Lazy<RwLock<Option<Option<SecretString>>>> =
    Lazy::new(|| RwLock::new(None));
static ADMIN_PASSWORD_CACHE: Lazy<RwLock<Option<Option<SecretString>>>> =
    Lazy::new(|| RwLock::new(None));

/// Credential store for secret management
pub struct CredentialStore;

impl CredentialStore {
    /// Store a secret in the keyring
    ///
    /// Updates both the keyring and the in-memory cache.
    pub fn store(secret: Secret, value: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, secret.keyring_name())?;
        entry.set_password(value)?;

        if let Ok(mut cache) = secret.cache().write() {
            *cache = Some(Some(SecretString::from(value.to_string())));
        }

        Ok(())
    }

    /// Retrieve a secret
    ///
    /// Priority: environment variable > cache > keyring
    pub fn get(secret: Secret) -> Result<Option<SecretString>> {
        if let Ok(value) = std::env::var(secret.env_var()) {
            if !value.is_empty() {
                return Ok(Some(SecretString::from(value)));
            }
        }

        if let Ok(cache) = secret.cache().read() {
            if let Some(cached_value) = cache.as_ref() {
                return Ok(cached_value.clone());
            }
        }

        let result = Self::fetch_from_keyring(secret)?;

        if let Ok(mut cache) = secret.cache().write() {
            *cache = Some(result.clone());
        }

        Ok(result)
    }

    /// Fetch directly from keyring (no cache)
    fn fetch_from_keyring(secret: Secret) -> Result<Option<SecretString>> {
        let entry = Entry::new(SERVICE_NAME, secret.keyring_name())?;
        match entry.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(EduQuestError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    /// Delete a stored secret
    ///
    /// Clears both the keyring and the in-memory cache.
    pub fn delete(secret: Secret) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, secret.keyring_name())?;
        let result = match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(EduQuestError::Credential(e.to_string())),
        };

        if let Ok(mut cache) = secret.cache().write() {
            *cache = Some(None);
        }

        result
    }

    /// Check if a secret is available
    pub fn has(secret: Secret) -> Result<bool> {
        Ok(Self::get(secret)?.is_some())
    }

    /// Get the Gemini API key, returning an error if not configured
    pub fn require_gemini_key() -> Result<SecretString> {
        Self::get(Secret::GeminiKey)?.ok_or(EduQuestError::GeminiNotConfigured)
    }

    /// Get a masked version of a secret for display (shows first 4 and last 4 chars)
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        let chars: Vec<char> = exposed.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        let short = SecretString::from("abc");
        assert_eq!(CredentialStore::mask_token(&short), "***");

        let long = SecretString::from("AIza1234567890abcdef");
        assert_eq!(CredentialStore::mask_token(&long), "AIza...cdef");
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(Secret::GeminiKey.env_var(), "GEMINI_API_KEY");
        assert_eq!(Secret::AdminPassword.env_var(), "EDUQUEST_ADMIN_PASSWORD");
    }
}
