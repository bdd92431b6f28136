//! Simulated account session and the advisory capability gate.
//!
//! This is not a security boundary: login and registration accept any
//! non-empty input, and the gate only tells the caller to show a login
//! prompt. Nothing is enforced server-side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::core::i18n::{Language, Strings};
use crate::core::store::{ConversationStore, USER_KEY};

pub mod credentials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

/// User intents that may be gated behind an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Chat,
    ImageAnalysis,
    FileUpload,
    AudioRecording,
    ImageGeneration,
}

impl Capability {
    /// Premium-labeled capabilities that prompt for a login when the session
    /// is unauthenticated. Purely advisory.
    pub fn requires_account(self) -> bool {
        matches!(
            self,
            Capability::FileUpload | Capability::AudioRecording | Capability::ImageGeneration
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCheck {
    pub required: bool,
    pub message: String,
}

/// Session holder backed by the persistence store. A present user record
/// implies an authenticated session.
pub struct AuthSession {
    store: Arc<dyn ConversationStore>,
    user: Option<User>,
    language: Language,
}

impl AuthSession {
    /// Restore the session from the store. A corrupt record degrades to an
    /// unauthenticated session rather than an error.
    pub fn load(store: Arc<dyn ConversationStore>, language: Language) -> Self {
        let user = match store.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!("discarding unreadable stored user: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("could not read stored user: {err}");
                None
            }
        };
        Self {
            store,
            user,
            language,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Simulated login: any non-empty email and password are accepted; the
    /// display name is the local part of the email.
    pub fn login(&mut self, email: &str, password: &str) -> bool {
        if email.is_empty() || password.is_empty() {
            return false;
        }
        let name = email.split('@').next().unwrap_or(email).to_string();
        self.establish(email.to_string(), name);
        true
    }

    /// Simulated registration: any non-empty input is accepted.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> bool {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return false;
        }
        self.establish(email.to_string(), name.to_string());
        true
    }

    pub fn logout(&mut self) {
        self.user = None;
        if let Err(err) = self.store.remove(USER_KEY) {
            warn!("could not clear stored user: {err}");
        }
    }

    /// Advisory gate: tells the caller whether to block the capability and
    /// show a login prompt instead. The pipeline is never consulted.
    pub fn check_required(&self, capability: Capability) -> AuthCheck {
        if capability.requires_account() && !self.is_authenticated() {
            AuthCheck {
                required: true,
                message: Strings::auth_required(self.language).to_string(),
            }
        } else {
            AuthCheck {
                required: false,
                message: String::new(),
            }
        }
    }

    fn establish(&mut self, email: String, name: String) {
        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            is_premium: false,
            created_at: Utc::now(),
        };
        match serde_json::to_string(&user) {
            Ok(raw) => {
                if let Err(err) = self.store.set(USER_KEY, &raw) {
                    warn!("could not persist user: {err}");
                }
            }
            Err(err) => warn!("could not serialize user: {err}"),
        }
        self.user = Some(user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    fn session() -> AuthSession {
        AuthSession::load(Arc::new(MemoryStore::new()), Language::Fr)
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let mut session = session();
        assert!(!session.login("", "secret"));
        assert!(!session.login("a@b.c", ""));
        assert!(!session.register("", "a@b.c", "secret"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn login_derives_name_from_email() {
        let mut session = session();
        assert!(session.login("marie@example.org", "secret"));
        let user = session.user().unwrap();
        assert_eq!(user.name, "marie");
        assert!(!user.is_premium);
        assert!(session.is_authenticated());
    }

    #[test]
    fn gated_capabilities_prompt_when_unauthenticated() {
        let session = session();
        for capability in [
            Capability::FileUpload,
            Capability::AudioRecording,
            Capability::ImageGeneration,
        ] {
            let check = session.check_required(capability);
            assert!(check.required);
            assert_eq!(check.message, Strings::auth_required(Language::Fr));
        }
        assert!(!session.check_required(Capability::Chat).required);
        assert!(!session.check_required(Capability::ImageAnalysis).required);
    }

    #[test]
    fn authenticated_sessions_pass_every_gate() {
        let mut session = session();
        session.register("Marie", "marie@example.org", "secret");
        for capability in [
            Capability::Chat,
            Capability::ImageAnalysis,
            Capability::FileUpload,
            Capability::AudioRecording,
            Capability::ImageGeneration,
        ] {
            assert!(!session.check_required(capability).required);
        }
    }

    #[test]
    fn session_survives_restart_and_logout_clears_it() {
        let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
        {
            let mut session = AuthSession::load(store.clone(), Language::Fr);
            session.register("Marie", "marie@example.org", "secret");
        }

        let mut restored = AuthSession::load(store.clone(), Language::Fr);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().unwrap().email, "marie@example.org");

        restored.logout();
        let after_logout = AuthSession::load(store, Language::Fr);
        assert!(!after_logout.is_authenticated());
    }

    #[test]
    fn corrupt_stored_user_degrades_to_unauthenticated() {
        let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "not json").unwrap();
        let session = AuthSession::load(store, Language::Fr);
        assert!(!session.is_authenticated());
    }
}
