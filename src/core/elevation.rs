//! Shared-secret gate for teacher mode

use secrecy::{ExposeSecret, SecretString};

use crate::core::credentials::{CredentialStore, Secret};
use crate::error::{EduQuestError, Result};

/// Compares password attempts against the configured teacher password
#[derive(Clone, Default)]
pub struct ElevationGate {
    expected: Option<SecretString>,
}

impl std::fmt::Debug for ElevationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevationGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl ElevationGate {
    pub fn new(expected: Option<SecretString>) -> Self {
        Self { expected }
    }

    /// Gate configured with a known password
    pub fn with_password(password: &str) -> Self {
        Self::new(Some(SecretString::from(password.to_string())))
    }

    /// Gate backed by the credential store (env var or keyring)
    pub fn from_credentials() -> Result<Self> {
        Ok(Self::new(CredentialStore::get(Secret::AdminPassword)?))
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Check an attempt. No lockout: callers may retry immediately.
    pub fn verify(&self, attempt: &str) -> Result<()> {
        let expected = self
            .expected
            .as_ref()
            .ok_or(EduQuestError::ElevationNotConfigured)?;

        if constant_time_eq(expected.expose_secret().as_bytes(), attempt.as_bytes()) {
            Ok(())
        } else {
            tracing::warn!("rejected teacher password attempt");
            Err(EduQuestError::AccessDenied)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
