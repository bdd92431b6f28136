//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands.

pub mod chat;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::auth::credentials::CredentialManager;
use crate::cli::chat::run_chat;
use crate::core::config::Config;
use crate::core::i18n::Language;

#[derive(Parser)]
#[command(name = "tosca")]
#[command(about = "A terminal chat assistant with vision, OCR, and image generation")]
#[command(
    long_about = "Tosca is a terminal chat assistant that connects text, vision, OCR, and \
image-generation APIs through a single proxy. Conversations are stored locally \
and survive restarts.\n\n\
Authentication:\n\
  Use 'tosca auth' to store your API key securely in the system keyring.\n\n\
Environment Variables (fallback if no key stored):\n\
  TOSCA_API_KEY     API key for the forwarding proxy\n\
  TOSCA_BASE_URL    Custom proxy base URL (optional)\n\n\
Commands inside the chat:\n\
  /new              Start a new conversation\n\
  /list             List conversations\n\
  /switch <n>       Switch to conversation n\n\
  /image <prompt>   Generate an image\n\
  /ask <url> [q]    Ask about an image\n\
  /file <path>      Share a file (images are OCR'd)\n\
  /record, /stop    Record a voice note\n\
  /login, /logout   Manage the account session\n\
  /log [file]       Toggle transcript logging\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the API key in the system keyring
    Auth,
    /// Remove the API key from the system keyring
    Deauth,
    /// Start the chat interface (default)
    Chat,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            let key = chat::prompt_line("Enter your API key: ")?;
            let manager = CredentialManager::new();
            manager.store_api_key(key.trim())?;
            println!("✅ API key stored in the system keyring");
            Ok(())
        }
        Commands::Deauth => {
            let manager = CredentialManager::new();
            manager.clear_api_key()?;
            println!("✅ API key removed from the system keyring");
            Ok(())
        }
        Commands::Set { key, value } => set_config(&key, value),
        Commands::Unset { key } => unset_config(&key),
        Commands::Chat => run_chat(args.log).await,
    }
}

fn set_config(key: &str, value: Option<String>) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    let Some(value) = value else {
        config.print_all();
        return Ok(());
    };

    match key {
        "base-url" => {
            config.base_url = Some(value.clone());
            config.save()?;
            println!("✅ Set base-url to: {value}");
        }
        "language" => match Language::parse(&value) {
            Some(language) => {
                config.language = Some(language);
                config.save()?;
                println!("✅ Set language to: {value}");
            }
            None => {
                eprintln!("❌ Unknown language: {value} (use 'fr' or 'en')");
            }
        },
        "negative-prompt" => {
            config.image_defaults.negative_prompt = Some(value.clone());
            config.save()?;
            println!("✅ Set negative-prompt to: {value}");
        }
        "steps" => match value.parse::<u32>() {
            Ok(steps) => {
                config.image_defaults.steps = Some(steps);
                config.save()?;
                println!("✅ Set steps to: {steps}");
            }
            Err(_) => eprintln!("❌ Invalid step count: {value}"),
        },
        "guidance-scale" => match value.parse::<f64>() {
            Ok(scale) => {
                config.image_defaults.guidance_scale = Some(scale);
                config.save()?;
                println!("✅ Set guidance-scale to: {scale}");
            }
            Err(_) => eprintln!("❌ Invalid guidance scale: {value}"),
        },
        _ => {
            eprintln!("❌ Unknown config key: {key}");
            eprintln!("   Available keys: base-url, language, negative-prompt, steps, guidance-scale");
        }
    }
    Ok(())
}

fn unset_config(key: &str) -> Result<(), Box<dyn Error>> {
    let mut config = Config::load()?;
    match key {
        "base-url" => config.base_url = None,
        "language" => config.language = None,
        "negative-prompt" => config.image_defaults.negative_prompt = None,
        "steps" => config.image_defaults.steps = None,
        "guidance-scale" => config.image_defaults.guidance_scale = None,
        _ => {
            eprintln!("❌ Unknown config key: {key}");
            return Ok(());
        }
    }
    config.save()?;
    println!("✅ Unset {key}");
    Ok(())
}
