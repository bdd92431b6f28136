//! Message pipeline: turns user intents into message pairs and remote calls.
//!
//! Every action follows the same shape: append the request message, flip the
//! busy flag, call the capability, append the response message (substituted
//! through [`crate::core::rebrand`]), clear the busy flag. A capability
//! failure appends exactly one localized apology and is never retried; no
//! failure is fatal to the session.
//!
//! Actions take `&mut self` and run to completion, so sends within one
//! conversation are serialized in submission order.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::client::CapabilityClient;
use crate::api::{ChatMessage, ImageGenerationRequest};
use crate::core::config::ImageDefaults;
use crate::core::i18n::{Language, Strings};
use crate::core::message::{MediaFlags, Message, MessageRole};
use crate::core::rebrand;
use crate::core::registry::ConversationRegistry;
use crate::core::store::{messages_key, ConversationStore};

const SAMPLE_AUDIO_URL: &str = "/sample-audio.mp3";

pub struct ChatPipeline {
    store: Arc<dyn ConversationStore>,
    client: Arc<dyn CapabilityClient>,
    registry: ConversationRegistry,
    messages: Vec<Message>,
    language: Language,
    image_defaults: ImageDefaults,
    is_loading: bool,
    is_recording: bool,
}

impl ChatPipeline {
    /// Restore the registry from the store and select the most recent
    /// conversation, creating one when the store is empty.
    pub fn new(
        store: Arc<dyn ConversationStore>,
        client: Arc<dyn CapabilityClient>,
        language: Language,
        image_defaults: ImageDefaults,
    ) -> Self {
        let registry = ConversationRegistry::load(store.clone(), language);
        let mut pipeline = Self {
            store,
            client,
            registry,
            messages: Vec::new(),
            language,
            image_defaults,
            is_loading: false,
            is_recording: false,
        };

        match pipeline.registry.conversations().first().map(|c| c.id) {
            Some(id) => {
                pipeline.select_conversation(id);
            }
            None => {
                pipeline.new_conversation();
            }
        }
        pipeline
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn registry(&self) -> &ConversationRegistry {
        &self.registry
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Start a fresh conversation and clear the active transcript.
    pub fn new_conversation(&mut self) -> Uuid {
        let id = self.registry.start_new();
        self.messages.clear();
        id
    }

    /// Switch conversations and reload that transcript from the store
    /// (empty when nothing was stored). Returns false for an unknown id.
    pub fn select_conversation(&mut self, id: Uuid) -> bool {
        if !self.registry.select(id) {
            return false;
        }
        self.messages = match self.store.get(&messages_key(id)) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("discarding unreadable transcript for {id}: {err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("could not read transcript for {id}: {err}");
                Vec::new()
            }
        };
        true
    }

    /// Send a chat message over the full conversation history.
    pub async fn send_message(&mut self, content: &str) -> Message {
        let conversation_id = self.current_conversation();
        let modified = rebrand::apply(content);
        self.append(conversation_id, Message::text(MessageRole::User, modified));

        self.is_loading = true;
        let history: Vec<ChatMessage> = self
            .messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        let response = match self.client.chat_completion(history).await {
            Ok(text) => Message::text(MessageRole::Assistant, rebrand::apply(&text)),
            Err(err) => {
                warn!("chat completion failed: {err}");
                Message::text(MessageRole::Assistant, Strings::chat_apology(self.language))
            }
        };
        let response = self.append(conversation_id, response);
        self.is_loading = false;
        response
    }

    /// Ask the vision capability about an image.
    pub async fn ask_about_image(&mut self, image_url: &str, question: Option<&str>) -> Message {
        let conversation_id = self.current_conversation();
        let modified_question = question.map(rebrand::apply);
        let content = modified_question
            .clone()
            .unwrap_or_else(|| Strings::describe_image_default(self.language).to_string());
        self.append(
            conversation_id,
            Message::image(MessageRole::User, content, image_url),
        );
        self.registry
            .update_flags(conversation_id, MediaFlags::images());

        self.is_loading = true;
        let response = match self
            .client
            .analyze_image(image_url, modified_question.as_deref())
            .await
        {
            Ok(analysis) => Message::text(MessageRole::Assistant, rebrand::apply(&analysis)),
            Err(err) => {
                warn!("image analysis failed: {err}");
                Message::text(MessageRole::Assistant, Strings::chat_apology(self.language))
            }
        };
        let response = self.append(conversation_id, response);
        self.is_loading = false;
        response
    }

    /// Record a shared file. Images are routed through OCR; any other file
    /// gets a synthesized acknowledgement without a remote call.
    pub async fn upload_file(
        &mut self,
        file_name: &str,
        file_size_bytes: u64,
        file_url: &str,
        mime_type: &str,
    ) -> Message {
        let conversation_id = self.current_conversation();
        self.append(
            conversation_id,
            Message::file(
                MessageRole::User,
                Strings::shared_file(self.language, file_name),
                file_name,
                file_size_bytes,
                file_url,
            ),
        );
        self.registry
            .update_flags(conversation_id, MediaFlags::files());

        self.is_loading = true;
        let response = if mime_type.starts_with("image/") {
            match self.client.extract_text(file_url).await {
                Ok(text) => Message::text(
                    MessageRole::Assistant,
                    format!(
                        "{}\n\n{}",
                        Strings::extraction_intro(self.language),
                        rebrand::apply(&text)
                    ),
                ),
                Err(err) => {
                    warn!("text extraction failed: {err}");
                    Message::text(MessageRole::Assistant, Strings::file_apology(self.language))
                }
            }
        } else {
            debug!("non-image file {file_name}, skipping remote call");
            Message::text(
                MessageRole::Assistant,
                Strings::file_acknowledgement(self.language, file_name),
            )
        };
        let response = self.append(conversation_id, response);
        self.is_loading = false;
        response
    }

    /// First phase of audio capture: flip the recording flag, nothing else.
    pub fn start_recording(&mut self) {
        self.is_recording = true;
    }

    /// Second phase: append a placeholder audio message and a synthesized
    /// acknowledgement. No transcription happens. Returns None when no
    /// recording was in progress.
    pub fn stop_recording(&mut self) -> Option<Message> {
        if !self.is_recording {
            return None;
        }
        self.is_recording = false;

        let conversation_id = self.current_conversation();
        self.append(
            conversation_id,
            Message::audio(
                MessageRole::User,
                Strings::recorded_audio(self.language),
                SAMPLE_AUDIO_URL,
            ),
        );
        self.registry
            .update_flags(conversation_id, MediaFlags::audio());

        self.is_loading = true;
        let response = self.append(
            conversation_id,
            Message::text(
                MessageRole::Assistant,
                Strings::audio_acknowledgement(self.language),
            ),
        );
        self.is_loading = false;
        Some(response)
    }

    /// Generate an image from a prompt. Substitution is applied to the prompt
    /// before dispatch, so the remote service never sees the original terms.
    pub async fn generate_image(&mut self, prompt: &str) -> Message {
        let conversation_id = self.current_conversation();
        let modified = rebrand::apply(prompt);
        self.append(
            conversation_id,
            Message::text(
                MessageRole::User,
                Strings::generate_image_request(self.language, &modified),
            ),
        );

        self.is_loading = true;
        let request = ImageGenerationRequest {
            prompt: modified.clone(),
            negative_prompt: self.image_defaults.negative_prompt.clone(),
            steps: self.image_defaults.steps,
            guidance_scale: self.image_defaults.guidance_scale,
        };
        let response = match self.client.generate_image(&request).await {
            Ok(image_url) => {
                self.registry
                    .update_flags(conversation_id, MediaFlags::images());
                Message::image(
                    MessageRole::Assistant,
                    Strings::generated_image_caption(self.language, &modified),
                    image_url,
                )
            }
            Err(err) => {
                warn!("image generation failed: {err}");
                Message::text(MessageRole::Assistant, Strings::image_apology(self.language))
            }
        };
        let response = self.append(conversation_id, response);
        self.is_loading = false;
        response
    }

    fn current_conversation(&mut self) -> Uuid {
        match self.registry.current_id() {
            Some(id) => id,
            None => self.new_conversation(),
        }
    }

    /// Append a message, persist the transcript, and give the registry a
    /// chance to derive the title. Returns a clone of the stored message.
    fn append(&mut self, conversation_id: Uuid, message: Message) -> Message {
        self.messages.push(message.clone());
        match serde_json::to_string(&self.messages) {
            Ok(raw) => {
                if let Err(err) = self.store.set(&messages_key(conversation_id), &raw) {
                    warn!("could not persist transcript for {conversation_id}: {err}");
                }
            }
            Err(err) => warn!("could not serialize transcript: {err}"),
        }
        self.registry
            .maybe_derive_title(conversation_id, &self.messages);
        message
    }
}
