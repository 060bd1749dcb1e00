// Translation providers
//
// Every provider answers two requests: translate a text into a target
// language, and name the language a text is written in.
// - Google: the public web translation endpoint
// - Ollama: a local LLM prompted to translate or detect

pub mod google;
pub mod ollama;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{TranslateConfig, TranslationProvider};
use crate::error::Result;

pub use google::GoogleTranslator;
pub use ollama::OllamaTranslator;

/// Remote text translation capability
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` into `target`. A `None` source lets the service detect it.
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String>;

    /// Detect the language code of `text`
    async fn detect_language(&self, text: &str) -> Result<String>;
}

/// Factory for creating translation backends
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: &TranslateConfig) -> Result<Box<dyn TranslationBackend>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        match config.provider {
            TranslationProvider::Google => {
                Ok(Box::new(GoogleTranslator::new(client, &config.endpoint)))
            }
            TranslationProvider::Ollama => {
                Ok(Box::new(OllamaTranslator::new(client, &config.endpoint, &config.model)))
            }
        }
    }
}
