//! Ordered conversation registry, mirrored to the persistence store.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::core::i18n::{Language, Strings};
use crate::core::message::{Conversation, MediaFlags, Message};
use crate::core::store::{ConversationStore, CONVERSATIONS_KEY};

const TITLE_MAX_CHARS: usize = 30;

/// Most-recent-first list of conversation summaries plus the current
/// selection. Every mutation is mirrored to the store, so order and content
/// survive restarts.
pub struct ConversationRegistry {
    store: Arc<dyn ConversationStore>,
    conversations: Vec<Conversation>,
    current_id: Option<Uuid>,
    language: Language,
}

impl ConversationRegistry {
    pub fn load(store: Arc<dyn ConversationStore>, language: Language) -> Self {
        let conversations = match store.get(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("discarding unreadable conversation registry: {err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("could not read conversation registry: {err}");
                Vec::new()
            }
        };

        Self {
            store,
            conversations,
            current_id: None,
            language,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current_id
    }

    pub fn current(&self) -> Option<&Conversation> {
        self.current_id
            .and_then(|id| self.conversations.iter().find(|c| c.id == id))
    }

    pub fn get(&self, id: Uuid) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Create a conversation with the default placeholder title, prepend it,
    /// and make it current.
    pub fn start_new(&mut self) -> Uuid {
        let conversation =
            Conversation::new(Strings::default_conversation_title(self.language));
        let id = conversation.id;
        self.conversations.insert(0, conversation);
        self.current_id = Some(id);
        self.persist();
        id
    }

    /// Switch the current conversation. Returns false when the id is unknown.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.conversations.iter().any(|c| c.id == id) {
            self.current_id = Some(id);
            true
        } else {
            false
        }
    }

    /// Derive the title from the first user message, once, while the title
    /// still equals the default placeholder. Truncated at 30 characters with
    /// an ellipsis when the source is longer.
    pub fn maybe_derive_title(&mut self, id: Uuid, messages: &[Message]) {
        let placeholder = Strings::default_conversation_title(self.language);
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if conversation.title != placeholder {
            return;
        }
        let Some(first_user) = messages.iter().find(|m| m.is_user()) else {
            return;
        };

        let content = &first_user.content;
        let truncated: String = content.chars().take(TITLE_MAX_CHARS).collect();
        conversation.title = if content.chars().count() > TITLE_MAX_CHARS {
            format!("{truncated}...")
        } else {
            truncated
        };
        self.persist();
    }

    /// Merge media-presence flags into a conversation. Monotonic: a flag that
    /// is already true stays true.
    pub fn update_flags(&mut self, id: Uuid, flags: MediaFlags) {
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if let Some(true) = flags.has_images {
            conversation.has_images = true;
        }
        if let Some(true) = flags.has_files {
            conversation.has_files = true;
        }
        if let Some(true) = flags.has_audio {
            conversation.has_audio = true;
        }
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_string(&self.conversations) {
            Ok(raw) => {
                if let Err(err) = self.store.set(CONVERSATIONS_KEY, &raw) {
                    warn!("could not persist conversation registry: {err}");
                }
            }
            Err(err) => warn!("could not serialize conversation registry: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageRole;
    use crate::core::store::MemoryStore;

    fn registry() -> ConversationRegistry {
        ConversationRegistry::load(Arc::new(MemoryStore::new()), Language::Fr)
    }

    #[test]
    fn new_conversations_are_prepended_and_current() {
        let mut registry = registry();
        let first = registry.start_new();
        let second = registry.start_new();
        assert_eq!(registry.current_id(), Some(second));
        assert_eq!(registry.conversations()[0].id, second);
        assert_eq!(registry.conversations()[1].id, first);
    }

    #[test]
    fn title_stays_default_until_first_message() {
        let mut registry = registry();
        let id = registry.start_new();
        assert_eq!(registry.get(id).unwrap().title, "Nouvelle conversation");

        registry.maybe_derive_title(id, &[]);
        assert_eq!(registry.get(id).unwrap().title, "Nouvelle conversation");

        let messages = vec![Message::text(MessageRole::User, "Bonjour")];
        registry.maybe_derive_title(id, &messages);
        assert_eq!(registry.get(id).unwrap().title, "Bonjour");
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let mut registry = registry();
        let id = registry.start_new();
        let long = "a".repeat(45);
        let messages = vec![Message::text(MessageRole::User, long.clone())];
        registry.maybe_derive_title(id, &messages);
        assert_eq!(registry.get(id).unwrap().title, format!("{}...", "a".repeat(30)));
    }

    #[test]
    fn exact_thirty_char_titles_get_no_ellipsis() {
        let mut registry = registry();
        let id = registry.start_new();
        let exact = "b".repeat(30);
        registry.maybe_derive_title(id, &[Message::text(MessageRole::User, exact.clone())]);
        assert_eq!(registry.get(id).unwrap().title, exact);
    }

    #[test]
    fn title_never_changes_after_first_derivation() {
        let mut registry = registry();
        let id = registry.start_new();
        registry.maybe_derive_title(id, &[Message::text(MessageRole::User, "premier")]);
        registry.maybe_derive_title(id, &[Message::text(MessageRole::User, "deuxième")]);
        assert_eq!(registry.get(id).unwrap().title, "premier");
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let mut registry = registry();
        let id = registry.start_new();
        let accented = "é".repeat(40);
        registry.maybe_derive_title(id, &[Message::text(MessageRole::User, accented)]);
        assert_eq!(registry.get(id).unwrap().title, format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn media_flags_are_monotonic() {
        let mut registry = registry();
        let id = registry.start_new();
        registry.update_flags(id, MediaFlags::images());
        registry.update_flags(
            id,
            MediaFlags {
                has_images: Some(false),
                has_files: Some(true),
                has_audio: None,
            },
        );
        let conversation = registry.get(id).unwrap();
        assert!(conversation.has_images);
        assert!(conversation.has_files);
        assert!(!conversation.has_audio);
    }

    #[test]
    fn registry_survives_reload() {
        let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
        let (first, second) = {
            let mut registry = ConversationRegistry::load(store.clone(), Language::Fr);
            let first = registry.start_new();
            registry.maybe_derive_title(first, &[Message::text(MessageRole::User, "salut")]);
            let second = registry.start_new();
            registry.update_flags(second, MediaFlags::audio());
            (first, second)
        };

        let reloaded = ConversationRegistry::load(store, Language::Fr);
        assert_eq!(reloaded.conversations().len(), 2);
        assert_eq!(reloaded.conversations()[0].id, second);
        assert!(reloaded.conversations()[0].has_audio);
        assert_eq!(reloaded.conversations()[1].id, first);
        assert_eq!(reloaded.conversations()[1].title, "salut");
    }

    #[test]
    fn selecting_an_unknown_conversation_fails() {
        let mut registry = registry();
        registry.start_new();
        assert!(!registry.select(Uuid::new_v4()));
    }
}
