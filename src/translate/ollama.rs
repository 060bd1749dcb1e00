use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::TranslationBackend;
use crate::error::{DeskError, Result};
use crate::languages::code_to_name;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub language: String,
}

/// Translator backed by a local Ollama model
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaTranslator {
    pub fn new(client: Client, endpoint: &str, model: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Run one JSON-format generation and return the raw response text
    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Sending generation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeskError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeskError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| DeskError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_response = generated.response.trim().to_string();
        debug!("Raw Ollama response: {}", raw_response);

        if raw_response.is_empty() {
            return Err(DeskError::Translation("Empty response received".to_string()));
        }
        Ok(raw_response)
    }

    /// Check if Ollama is reachable and the model is pulled
    pub async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.endpoint);

        let response = self.client
            .post(&url)
            .json(&json!({ "name": self.model }))
            .send()
            .await
            .map_err(|e| DeskError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.model);
            Ok(())
        } else {
            Err(DeskError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.model, self.model
            )))
        }
    }
}

fn build_translation_prompt(text: &str, source: Option<&str>, target: &str) -> String {
    let target_name = code_to_name(target);
    let source_line = match source {
        Some(code) => format!(
            "The source language is: {} (language code: {})\n",
            code_to_name(code),
            code
        ),
        None => String::new(),
    };

    format!(
        "You are a professional translator helping a customer support agent.\n\
         \n\
         CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
         {}The target language is: {} (language code: {})\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n\
         [Text to translate]\n\
         {}\n",
        target_name, source_line, target_name, target, target_name, text
    )
}

fn build_detection_prompt(text: &str) -> String {
    format!(
        "Identify the language of the text below.\n\
         \n\
         Return ONLY the ISO 639-1 language code in JSON format as {{\"language\":\"code\"}}.\n\
         \n\
         [Text]\n\
         {}\n",
        text
    )
}

/// Extract just the translation from a response that ignored the JSON format
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here is") ||
           trimmed.starts_with("Here are") ||
           trimmed.starts_with("Translation:") ||
           trimmed.starts_with("- ") ||
           trimmed.starts_with("* ") {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        return trimmed.to_string();
    }

    response.trim().to_string()
}

fn parse_translation(raw: &str) -> String {
    match serde_json::from_str::<TranslationResult>(raw) {
        Ok(result) => result.text.trim().to_string(),
        Err(_) => clean_translation_response(raw),
    }
}

fn parse_detection(raw: &str) -> Result<String> {
    let code = match serde_json::from_str::<DetectionResult>(raw) {
        Ok(result) => result.language,
        Err(_) => raw.to_string(),
    };
    let code = code.trim().trim_matches('"').to_lowercase();

    let plausible = (2..=7).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_lowercase() || c == '-');
    if plausible {
        Ok(code)
    } else {
        Err(DeskError::Translation(format!("Unrecognised language code: {}", raw)))
    }
}

#[async_trait]
impl TranslationBackend for OllamaTranslator {
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let raw = self.generate(build_translation_prompt(text, source, target)).await?;
        let translation = parse_translation(&raw);
        if translation.is_empty() {
            return Err(DeskError::Translation("Empty translation received".to_string()));
        }
        Ok(translation)
    }

    async fn detect_language(&self, text: &str) -> Result<String> {
        let raw = self.generate(build_detection_prompt(text)).await?;
        parse_detection(&raw)
    }
}
