//! Localized strings emitted by the pipeline and the auth gate.
//!
//! French is the product's primary language; the catalog here is limited to
//! the strings the pipeline itself produces, not the full UI surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

/// Strings the pipeline appends to transcripts, keyed by language.
pub struct Strings;

impl Strings {
    pub fn default_conversation_title(lang: Language) -> &'static str {
        match lang {
            Language::Fr => "Nouvelle conversation",
            Language::En => "New conversation",
        }
    }

    pub fn chat_apology(lang: Language) -> &'static str {
        match lang {
            Language::Fr => {
                "Désolé, j'ai rencontré une erreur en traitant votre demande. Veuillez réessayer."
            }
            Language::En => {
                "Sorry, I ran into an error while processing your request. Please try again."
            }
        }
    }

    pub fn file_apology(lang: Language) -> &'static str {
        match lang {
            Language::Fr => {
                "Désolé, j'ai rencontré une erreur en traitant votre fichier. Veuillez réessayer."
            }
            Language::En => {
                "Sorry, I ran into an error while processing your file. Please try again."
            }
        }
    }

    pub fn audio_apology(lang: Language) -> &'static str {
        match lang {
            Language::Fr => {
                "Désolé, j'ai rencontré une erreur en traitant votre audio. Veuillez réessayer."
            }
            Language::En => {
                "Sorry, I ran into an error while processing your audio. Please try again."
            }
        }
    }

    pub fn image_apology(lang: Language) -> &'static str {
        match lang {
            Language::Fr => {
                "Désolé, j'ai rencontré une erreur en générant l'image. Veuillez réessayer."
            }
            Language::En => "Sorry, I ran into an error while generating the image. Please try again.",
        }
    }

    pub fn extraction_intro(lang: Language) -> &'static str {
        match lang {
            Language::Fr => "J'ai analysé votre image et j'ai extrait le texte suivant:",
            Language::En => "I analyzed your image and extracted the following text:",
        }
    }

    pub fn shared_file(lang: Language, file_name: &str) -> String {
        match lang {
            Language::Fr => format!("J'ai partagé un fichier: {file_name}"),
            Language::En => format!("I shared a file: {file_name}"),
        }
    }

    pub fn file_acknowledgement(lang: Language, file_name: &str) -> String {
        match lang {
            Language::Fr => {
                format!("J'ai analysé votre fichier \"{file_name}\". Que souhaitez-vous savoir à son sujet ?")
            }
            Language::En => {
                format!("I analyzed your file \"{file_name}\". What would you like to know about it?")
            }
        }
    }

    pub fn recorded_audio(lang: Language) -> &'static str {
        match lang {
            Language::Fr => "J'ai enregistré un message audio",
            Language::En => "I recorded an audio message",
        }
    }

    pub fn audio_acknowledgement(lang: Language) -> &'static str {
        match lang {
            Language::Fr => "J'ai bien reçu votre message audio. Comment puis-je vous aider ?",
            Language::En => "I received your audio message. How can I help you?",
        }
    }

    pub fn generate_image_request(lang: Language, prompt: &str) -> String {
        match lang {
            Language::Fr => format!("Génère une image: {prompt}"),
            Language::En => format!("Generate an image: {prompt}"),
        }
    }

    pub fn generated_image_caption(lang: Language, prompt: &str) -> String {
        match lang {
            Language::Fr => {
                format!("Voici l'image générée selon votre description: \"{prompt}\"")
            }
            Language::En => format!("Here is the image generated from your description: \"{prompt}\""),
        }
    }

    pub fn describe_image_default(lang: Language) -> &'static str {
        match lang {
            Language::Fr => "Décris cette image en détail.",
            Language::En => "Describe this image in detail.",
        }
    }

    pub fn auth_required(lang: Language) -> &'static str {
        match lang {
            Language::Fr => {
                "Cette fonctionnalité nécessite un compte. Veuillez vous connecter ou vous inscrire."
            }
            Language::En => "This feature requires an account. Please login or register.",
        }
    }
}
