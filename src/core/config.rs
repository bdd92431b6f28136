use std::error::Error;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::i18n::Language;

pub const DEFAULT_BASE_URL: &str = "https://api.tosca.app/v1";

/// Image-generation parameters sent alongside every prompt.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ImageDefaults {
    pub negative_prompt: Option<String>,
    pub steps: Option<u32>,
    pub guidance_scale: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Override for the forwarding-boundary base URL.
    pub base_url: Option<String>,
    /// UI and transcript language ("fr" or "en"); French when unset.
    pub language: Option<Language>,
    #[serde(default)]
    pub image_defaults: ImageDefaults,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn Error>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        let proj_dirs = ProjectDirs::from("org", "toscanisoft", "tosca")
            .ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.base_url {
            Some(url) => println!("  base-url: {url}"),
            None => println!("  base-url: (unset, using {DEFAULT_BASE_URL})"),
        }
        println!("  language: {}", self.language().as_str());
        match &self.image_defaults.negative_prompt {
            Some(prompt) => println!("  negative-prompt: {prompt}"),
            None => println!("  negative-prompt: (unset)"),
        }
        match self.image_defaults.steps {
            Some(steps) => println!("  steps: {steps}"),
            None => println!("  steps: (unset)"),
        }
        match self.image_defaults.guidance_scale {
            Some(scale) => println!("  guidance-scale: {scale}"),
            None => println!("  guidance-scale: (unset)"),
        }
    }
}
