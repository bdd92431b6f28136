//! Interactive chat loop over stdin/stdout.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use crate::api::client::HttpCapabilityClient;
use crate::auth::credentials::CredentialManager;
use crate::auth::{AuthSession, Capability};
use crate::core::config::Config;
use crate::core::i18n::Language;
use crate::core::message::Message;
use crate::core::pipeline::ChatPipeline;
use crate::core::store::FileStore;
use crate::utils::logging::LoggingState;

pub fn prompt_line(prompt: &str) -> Result<String, Box<dyn Error>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("pdf") => "application/pdf",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn role_label(message: &Message, language: Language) -> &'static str {
    if message.is_user() {
        match language {
            Language::Fr => "Vous",
            Language::En => "You",
        }
    } else {
        "Tosca"
    }
}

fn print_new_messages(pipeline: &ChatPipeline, from: usize, logging: &LoggingState) {
    for message in &pipeline.messages()[from..] {
        let line = format!("{}: {}", role_label(message, pipeline.language()), message.content);
        println!("{line}");
        if let Some(url) = &message.image_url {
            println!("   [image] {url}");
        }
        if let Some(url) = &message.audio_url {
            println!("   [audio] {url}");
        }
        if let Err(err) = logging.log_message(&line) {
            eprintln!("⚠️  Could not write to the transcript log: {err}");
        }
    }
}

/// Consult the advisory gate; when a login is required, offer it inline.
/// Returns true when the action may proceed.
fn ensure_allowed(session: &mut AuthSession, capability: Capability) -> bool {
    let check = session.check_required(capability);
    if !check.required {
        return true;
    }
    println!("🔒 {}", check.message);
    match prompt_line("Se connecter maintenant ? (o/n) ") {
        Ok(answer) if matches!(answer.trim(), "o" | "O" | "y" | "Y" | "oui" | "yes") => {
            login_flow(session)
        }
        _ => false,
    }
}

fn login_flow(session: &mut AuthSession) -> bool {
    let email = prompt_line("Email: ").unwrap_or_default();
    let password = prompt_line("Mot de passe: ").unwrap_or_default();
    if session.login(&email, &password) {
        println!("✅ Connecté en tant que {}", session.user().map(|u| u.name.as_str()).unwrap_or(""));
        true
    } else {
        println!("❌ Email et mot de passe sont requis");
        false
    }
}

fn register_flow(session: &mut AuthSession) {
    let name = prompt_line("Nom: ").unwrap_or_default();
    let email = prompt_line("Email: ").unwrap_or_default();
    let password = prompt_line("Mot de passe: ").unwrap_or_default();
    if session.register(&name, &email, &password) {
        println!("✅ Compte créé pour {name}");
    } else {
        println!("❌ Nom, email et mot de passe sont requis");
    }
}

fn list_conversations(pipeline: &ChatPipeline) {
    for (index, conversation) in pipeline.registry().conversations().iter().enumerate() {
        let current = if Some(conversation.id) == pipeline.registry().current_id() {
            "*"
        } else {
            " "
        };
        let mut media = String::new();
        if conversation.has_images {
            media.push_str(" 🖼");
        }
        if conversation.has_files {
            media.push_str(" 📎");
        }
        if conversation.has_audio {
            media.push_str(" 🎤");
        }
        println!("{current} {index}: {}{media}", conversation.title);
    }
}

pub async fn run_chat(log: Option<String>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    let language = config.language();
    let credentials = CredentialManager::new();
    let api_key = credentials.resolve_api_key()?;
    let base_url = credentials
        .env_base_url()
        .unwrap_or_else(|| config.base_url().to_string());

    let store = Arc::new(FileStore::new()?);
    let client = Arc::new(HttpCapabilityClient::new(base_url, api_key)?);
    let mut pipeline = ChatPipeline::new(
        store.clone(),
        client,
        language,
        config.image_defaults.clone(),
    );
    let mut session = AuthSession::load(store, language);
    let mut logging = LoggingState::new(log);

    println!("Tosca — assistant IA ({})", language.as_str());
    println!("Tapez un message, ou /help pour les commandes.");
    print_new_messages(&pipeline, 0, &LoggingState::new(None));
    let mut seen = pipeline.messages().len();

    loop {
        let line = prompt_line("> ")?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(command) = trimmed.strip_prefix('/') {
            let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
            let rest = rest.trim();
            match name {
                "quit" | "exit" => break,
                "help" => {
                    println!("/new /list /switch <n> /image <prompt> /ask <url> [question]");
                    println!("/file <path> /record /stop /login /register /logout /lang <fr|en>");
                    println!("/log [file] /quit");
                }
                "new" => {
                    pipeline.new_conversation();
                    seen = 0;
                    println!("✅ Nouvelle conversation");
                }
                "list" => list_conversations(&pipeline),
                "switch" => match rest.parse::<usize>().ok().and_then(|index| {
                    pipeline.registry().conversations().get(index).map(|c| c.id)
                }) {
                    Some(id) => {
                        pipeline.select_conversation(id);
                        print_new_messages(&pipeline, 0, &LoggingState::new(None));
                        seen = pipeline.messages().len();
                    }
                    None => println!("❌ Conversation inconnue: {rest}"),
                },
                "image" => {
                    if rest.is_empty() {
                        println!("Usage: /image <prompt>");
                    } else if ensure_allowed(&mut session, Capability::ImageGeneration) {
                        pipeline.generate_image(rest).await;
                        print_new_messages(&pipeline, seen, &logging);
                        seen = pipeline.messages().len();
                    }
                }
                "ask" => {
                    let (url, question) = rest.split_once(' ').unwrap_or((rest, ""));
                    if url.is_empty() {
                        println!("Usage: /ask <image-url> [question]");
                    } else if ensure_allowed(&mut session, Capability::ImageAnalysis) {
                        let question = (!question.trim().is_empty()).then(|| question.trim());
                        pipeline.ask_about_image(url, question).await;
                        print_new_messages(&pipeline, seen, &logging);
                        seen = pipeline.messages().len();
                    }
                }
                "file" => {
                    if rest.is_empty() {
                        println!("Usage: /file <path>");
                    } else if ensure_allowed(&mut session, Capability::FileUpload) {
                        let path = Path::new(rest);
                        match std::fs::metadata(path) {
                            Ok(metadata) => {
                                let name = path
                                    .file_name()
                                    .map(|n| n.to_string_lossy().into_owned())
                                    .unwrap_or_else(|| rest.to_string());
                                let url = format!("file://{rest}");
                                pipeline
                                    .upload_file(&name, metadata.len(), &url, guess_mime(path))
                                    .await;
                                print_new_messages(&pipeline, seen, &logging);
                                seen = pipeline.messages().len();
                            }
                            Err(err) => println!("❌ Fichier illisible: {err}"),
                        }
                    }
                }
                "record" => {
                    if ensure_allowed(&mut session, Capability::AudioRecording) {
                        pipeline.start_recording();
                        println!("🎤 Enregistrement... (/stop pour terminer)");
                    }
                }
                "stop" => match pipeline.stop_recording() {
                    Some(_) => {
                        print_new_messages(&pipeline, seen, &logging);
                        seen = pipeline.messages().len();
                    }
                    None => println!("❌ Aucun enregistrement en cours"),
                },
                "login" => {
                    login_flow(&mut session);
                }
                "register" => register_flow(&mut session),
                "logout" => {
                    session.logout();
                    println!("✅ Déconnecté");
                }
                "lang" => match Language::parse(rest) {
                    Some(new_language) => {
                        let mut config = Config::load()?;
                        config.language = Some(new_language);
                        config.save()?;
                        println!("✅ Langue enregistrée: {rest} (effective au prochain démarrage)");
                    }
                    None => println!("❌ Langue inconnue: {rest} (fr ou en)"),
                },
                "log" => {
                    let result = if rest.is_empty() {
                        logging.toggle_logging()
                    } else {
                        logging.set_log_file(rest.to_string())
                    };
                    match result {
                        Ok(status) => println!("{status}"),
                        Err(err) => println!("❌ {err}"),
                    }
                }
                _ => println!("❌ Commande inconnue: /{name}"),
            }
            continue;
        }

        if ensure_allowed(&mut session, Capability::Chat) {
            pipeline.send_message(trimmed).await;
            print_new_messages(&pipeline, seen, &logging);
            seen = pipeline.messages().len();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guessing_covers_image_types() {
        assert_eq!(guess_mime(Path::new("scan.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("notes.pdf")), "application/pdf");
        assert_eq!(guess_mime(Path::new("mystery")), "application/octet-stream");
    }
}
