use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == MessageRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == MessageRole::Assistant
    }
}

impl AsRef<str> for MessageRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for MessageRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for MessageRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<MessageRole> for String {
    fn from(value: MessageRole) -> Self {
        value.as_str().to_string()
    }
}

/// Content kind of a transcript message. Exactly one media payload on
/// [`Message`] is populated for each kind; the constructors below are the
/// only way messages are built, which keeps that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    File,
    Audio,
}

/// One turn in a conversation. Immutable once created; transcripts only ever
/// append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio_url: Option<String>,
}

impl Message {
    fn base(role: MessageRole, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            kind,
            timestamp: Utc::now(),
            image_url: None,
            file_name: None,
            file_size: None,
            file_url: None,
            audio_url: None,
        }
    }

    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self::base(role, MessageKind::Text, content)
    }

    pub fn image(
        role: MessageRole,
        content: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        let mut message = Self::base(role, MessageKind::Image, content);
        message.image_url = Some(image_url.into());
        message
    }

    pub fn file(
        role: MessageRole,
        content: impl Into<String>,
        file_name: impl Into<String>,
        file_size_bytes: u64,
        file_url: impl Into<String>,
    ) -> Self {
        let mut message = Self::base(role, MessageKind::File, content);
        message.file_name = Some(file_name.into());
        message.file_size = Some(format_file_size(file_size_bytes));
        message.file_url = Some(file_url.into());
        message
    }

    pub fn audio(
        role: MessageRole,
        content: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        let mut message = Self::base(role, MessageKind::Audio, content);
        message.audio_url = Some(audio_url.into());
        message
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }
}

/// Summary entry in the conversation registry. Title mutates at most once
/// (derived from the first user message); media flags only ever flip to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub has_images: bool,
    #[serde(default)]
    pub has_files: bool,
    #[serde(default)]
    pub has_audio: bool,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            timestamp: Utc::now(),
            has_images: false,
            has_files: false,
            has_audio: false,
        }
    }
}

/// Media-presence flags merged into a conversation summary. `None` fields are
/// left untouched; flags never reset to false.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaFlags {
    pub has_images: Option<bool>,
    pub has_files: Option<bool>,
    pub has_audio: Option<bool>,
}

impl MediaFlags {
    pub fn images() -> Self {
        Self {
            has_images: Some(true),
            ..Self::default()
        }
    }

    pub fn files() -> Self {
        Self {
            has_files: Some(true),
            ..Self::default()
        }
    }

    pub fn audio() -> Self {
        Self {
            has_audio: Some(true),
            ..Self::default()
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1_073_741_824 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{:.1} GB", bytes as f64 / 1_073_741_824.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_populate_exactly_one_payload() {
        let text = Message::text(MessageRole::User, "hello");
        assert_eq!(text.kind, MessageKind::Text);
        assert!(text.image_url.is_none() && text.file_url.is_none() && text.audio_url.is_none());

        let image = Message::image(MessageRole::Assistant, "caption", "https://img.example/1.png");
        assert_eq!(image.kind, MessageKind::Image);
        assert!(image.image_url.is_some());
        assert!(image.file_url.is_none() && image.audio_url.is_none());

        let file = Message::file(MessageRole::User, "shared", "notes.pdf", 2048, "blob:notes");
        assert_eq!(file.kind, MessageKind::File);
        assert_eq!(file.file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(file.file_size.as_deref(), Some("2.0 KB"));
        assert!(file.image_url.is_none() && file.audio_url.is_none());

        let audio = Message::audio(MessageRole::User, "voice note", "/sample-audio.mp3");
        assert_eq!(audio.kind, MessageKind::Audio);
        assert!(audio.audio_url.is_some());
        assert!(audio.image_url.is_none() && audio.file_url.is_none());
    }

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(MessageRole::try_from("system").is_err());
    }

    #[test]
    fn file_sizes_use_human_units() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1_048_576), "5.0 MB");
        assert_eq!(format_file_size(3 * 1_073_741_824), "3.0 GB");
    }

    #[test]
    fn messages_round_trip_through_json() {
        let message = Message::image(MessageRole::Assistant, "voici", "https://img.example/2.png");
        let json = serde_json::to_string(&message).unwrap();
        let restored: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, message.id);
        assert_eq!(restored.kind, MessageKind::Image);
        assert_eq!(restored.image_url, message.image_url);
    }
}
