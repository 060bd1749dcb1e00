use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::TranslationBackend;
use crate::error::{DeskError, Result};

/// Client for the public `translate_a/single` web endpoint
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn request(&self, text: &str, source: &str, target: &str) -> Result<Value> {
        let url = format!("{}/translate_a/single", self.endpoint);
        debug!("Sending translation request to: {} ({} -> {})", url, source, target);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| DeskError::Translation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DeskError::Translation(
                "Rate limited by translation service, try again later".to_string(),
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeskError::Translation(format!(
                "Translation API error {}: {}",
                status,
                error_text.trim()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DeskError::Translation(format!("Failed to parse response: {}", e)))
    }
}

/// Join the translated fragment of every sentence chunk
fn parse_translation(value: &Value) -> Result<String> {
    let chunks = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| DeskError::Translation("Response has no translation chunks".to_string()))?;

    let text: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(DeskError::Translation("Empty translation received".to_string()));
    }
    Ok(text)
}

fn parse_detected_language(value: &Value) -> Result<String> {
    value
        .get(2)
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DeskError::Translation("Response has no detected language".to_string()))
}

#[async_trait]
impl TranslationBackend for GoogleTranslator {
    async fn translate(&self, text: &str, source: Option<&str>, target: &str) -> Result<String> {
        let value = self.request(text, source.unwrap_or("auto"), target).await?;
        parse_translation(&value)
    }

    async fn detect_language(&self, text: &str) -> Result<String> {
        let value = self.request(text, "auto", "en").await?;
        parse_detected_language(&value)
    }
}
