//! API bearer-key resolution for the forwarding boundary.
//!
//! Resolution order: system keyring first, then environment variables. The
//! key authenticates this client to the proxy; it is deployment
//! configuration, not a user secret.

use std::error::Error;
use std::fmt;

use keyring::Entry;

const KEYRING_SERVICE: &str = "tosca";
const KEYRING_USER: &str = "api-key";

pub const API_KEY_ENV: &str = "TOSCA_API_KEY";
pub const BASE_URL_ENV: &str = "TOSCA_BASE_URL";

#[derive(Debug)]
pub struct CredentialError {
    message: String,
}

impl CredentialError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing() -> Self {
        Self::new(format!(
            "No API key configured. Run 'tosca auth' to store one, or set {API_KEY_ENV}."
        ))
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CredentialError {}

/// Stores and resolves the API key. `use_keyring: false` keeps tests and
/// headless environments off the platform keyring.
pub struct CredentialManager {
    use_keyring: bool,
}

impl CredentialManager {
    pub fn new() -> Self {
        Self::with_keyring(true)
    }

    pub fn with_keyring(use_keyring: bool) -> Self {
        Self { use_keyring }
    }

    fn entry(&self) -> Result<Entry, CredentialError> {
        Entry::new(KEYRING_SERVICE, KEYRING_USER)
            .map_err(|err| CredentialError::new(format!("keyring unavailable: {err}")))
    }

    /// Resolve the API key: keyring, then environment.
    pub fn resolve_api_key(&self) -> Result<String, CredentialError> {
        if self.use_keyring {
            match self.entry()?.get_password() {
                Ok(key) if !key.is_empty() => return Ok(key),
                Ok(_) | Err(keyring::Error::NoEntry) => {}
                Err(err) => {
                    return Err(CredentialError::new(format!("keyring access failed: {err}")))
                }
            }
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(CredentialError::missing)
    }

    /// Base URL override from the environment, when present.
    pub fn env_base_url(&self) -> Option<String> {
        std::env::var(BASE_URL_ENV).ok().filter(|url| !url.is_empty())
    }

    pub fn store_api_key(&self, key: &str) -> Result<(), CredentialError> {
        if key.is_empty() {
            return Err(CredentialError::new("refusing to store an empty API key"));
        }
        if !self.use_keyring {
            return Err(CredentialError::new(
                "keyring disabled; set the key via the environment instead",
            ));
        }
        self.entry()?
            .set_password(key)
            .map_err(|err| CredentialError::new(format!("could not store API key: {err}")))
    }

    pub fn clear_api_key(&self) -> Result<(), CredentialError> {
        if !self.use_keyring {
            return Ok(());
        }
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(CredentialError::new(format!(
                "could not remove API key: {err}"
            ))),
        }
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_never_stored() {
        let manager = CredentialManager::with_keyring(false);
        assert!(manager.store_api_key("").is_err());
    }

    #[test]
    fn keyring_disabled_falls_through_to_environment() {
        let manager = CredentialManager::with_keyring(false);
        // Isolate from the ambient environment.
        std::env::remove_var(API_KEY_ENV);
        assert!(manager.resolve_api_key().is_err());

        std::env::set_var(API_KEY_ENV, "sk-test");
        assert_eq!(manager.resolve_api_key().unwrap(), "sk-test");
        std::env::remove_var(API_KEY_ENV);
    }
}
