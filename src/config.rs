use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, DeskError};

fn default_gloss_enabled() -> bool {
    true
}

fn default_gloss_progress() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_bytes() -> u64 {
    20 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub translate: TranslateConfig,
    #[serde(default)]
    pub gloss: GlossConfig,
    #[serde(default)]
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Which classifier answers detection requests
    pub backend: ClassifierBackend,
    /// Path to the serialized model, used by the Model backend
    pub model_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierBackend {
    /// Model: Pre-trained naive Bayes model loaded from `model_path`
    Model,
    /// Whatlang: Built-in trigram detector, no model file needed
    Whatlang,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation service in use
    pub provider: TranslationProvider,
    /// Base URL of the translation service
    pub endpoint: String,
    /// Model name, only used by the Ollama provider
    pub model: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationProvider {
    /// Google: Public web translation endpoint
    Google,
    /// Ollama: Local LLM prompted for translations
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossConfig {
    /// Annotate translations with per-word glosses
    #[serde(default = "default_gloss_enabled")]
    pub enabled: bool,
    /// Show a progress bar while glosses are fetched
    #[serde(default = "default_gloss_progress")]
    pub progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Largest accepted PDF upload in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for GlossConfig {
    fn default() -> Self {
        Self {
            enabled: default_gloss_enabled(),
            progress: default_gloss_progress(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig {
                backend: ClassifierBackend::Model,
                model_path: "model.json".to_string(),
            },
            translate: TranslateConfig {
                provider: TranslationProvider::Google,
                endpoint: "https://translate.googleapis.com".to_string(),
                model: "llama3.2:3b".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            gloss: GlossConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeskError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DeskError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DeskError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DeskError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
