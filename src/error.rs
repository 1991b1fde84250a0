//! Custom error types for eduquest
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the eduquest application
#[derive(Error, Debug)]
pub enum EduQuestError {
    /// A required field was empty or malformed
    #[error("{0}")]
    Validation(String),

    /// A subject with this name already exists
    #[error("Subject '{0}' already exists.\n\n  → Choose a different name or remove the existing subject first.")]
    DuplicateSubject(String),

    /// An exercise referenced a subject that is not in the catalog
    #[error("Subject '{0}' does not exist.\n\n  → Run 'eduquest subjects' to see available subjects.")]
    UnknownSubject(String),

    /// Subject or exercise lookup failed
    #[error("{0} not found.")]
    NotFound(String),

    /// Wrong shared secret for elevated mode
    #[error("Incorrect password.")]
    AccessDenied,

    /// Catalog mutation attempted outside elevated mode
    #[error("This action is only available in teacher mode.\n\n  → Unlock it with the teacher password first.")]
    ElevationRequired,

    /// No shared secret has been configured
    #[error("Teacher mode is not set up.\n\n  → Run 'eduquest config set admin-password YOUR_PASSWORD' to configure it.\n  → Or set the EDUQUEST_ADMIN_PASSWORD environment variable.")]
    ElevationNotConfigured,

    /// No learner has registered yet
    #[error("Nobody is registered yet.\n\n  → Run 'eduquest register YOUR_NAME' to get started.")]
    NotRegistered,

    /// A learner identity already exists in this store
    #[error("Already registered as '{0}'.")]
    AlreadyRegistered(String),

    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse data: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Terminal/TUI error
    #[error("Terminal error: {0}\n\n  → Try resizing your terminal or restarting it.")]
    Terminal(String),

    /// Gemini API error
    #[error("AI generation failed: {0}")]
    GeminiApi(String),

    /// Gemini API not configured
    #[error("Gemini API key is not set up.\n\n  → Get an API key from https://aistudio.google.com/apikey\n  → Run 'eduquest config set gemini-key YOUR_KEY' to configure it.")]
    GeminiNotConfigured,

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,
}

impl EduQuestError {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        EduQuestError::Validation(msg.into())
    }
}

impl From<keyring::Error> for EduQuestError {
    fn from(err: keyring::Error) -> Self {
        EduQuestError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for EduQuestError {
    fn from(err: toml::de::Error) -> Self {
        EduQuestError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for EduQuestError {
    fn from(err: toml::ser::Error) -> Self {
        EduQuestError::Toml(err.to_string())
    }
}

/// Result type alias using EduQuestError
pub type Result<T> = std::result::Result<T, EduQuestError>;
