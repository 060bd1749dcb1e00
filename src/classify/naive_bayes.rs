use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Detection, LanguageClassifier};
use crate::error::{DeskError, Result};

fn default_ngram_range() -> (usize, usize) {
    (1, 3)
}

fn default_lowercase() -> bool {
    true
}

/// Multinomial naive Bayes over character n-gram counts.
///
/// The model is trained elsewhere and shipped as JSON. Rows of
/// `feature_log_prob` line up with `labels`; columns are addressed through
/// `vocabulary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    pub labels: Vec<String>,
    pub class_log_prior: Vec<f64>,
    pub feature_log_prob: Vec<Vec<f64>>,
    pub vocabulary: HashMap<String, usize>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
}

impl NaiveBayesModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DeskError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| DeskError::Config(format!("Failed to read language model: {}", e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(content)
            .map_err(|e| DeskError::Config(format!("Failed to parse language model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.labels.is_empty() {
            return Err(DeskError::Config("Language model has no labels".to_string()));
        }
        if self.class_log_prior.len() != self.labels.len()
            || self.feature_log_prob.len() != self.labels.len()
        {
            return Err(DeskError::Config(format!(
                "Language model has {} labels but {} priors and {} feature rows",
                self.labels.len(),
                self.class_log_prior.len(),
                self.feature_log_prob.len()
            )));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(DeskError::Config(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }
        let width = self.vocabulary.values().max().map(|max| max + 1).unwrap_or(0);
        if let Some(row) = self.feature_log_prob.iter().find(|row| row.len() < width) {
            return Err(DeskError::Config(format!(
                "Feature row has {} columns, vocabulary needs {}",
                row.len(),
                width
            )));
        }
        Ok(())
    }

    /// Count the vocabulary n-grams present in `text`, keyed by column
    fn feature_counts(&self, text: &str) -> HashMap<usize, f64> {
        let normalized = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        let chars: Vec<char> = normalized
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .chars()
            .collect();

        let mut counts = HashMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n > chars.len() {
                break;
            }
            for window in chars.windows(n) {
                let gram: String = window.iter().collect();
                if let Some(&column) = self.vocabulary.get(&gram) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }

    fn joint_log_likelihood(&self, text: &str) -> Vec<f64> {
        let counts = self.feature_counts(text);
        debug!("Classifier matched {} distinct n-grams", counts.len());

        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, row)| {
                prior + counts.iter().map(|(&column, count)| count * row[column]).sum::<f64>()
            })
            .collect()
    }

    /// Class probabilities in label order
    pub fn predict_proba(&self, text: &str) -> Result<Vec<f64>> {
        if text.trim().is_empty() {
            return Err(DeskError::Classification(
                "Cannot classify empty text".to_string(),
            ));
        }

        let jll = self.joint_log_likelihood(text);
        let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(DeskError::Classification(
                "Model produced no finite score".to_string(),
            ));
        }
        let exp: Vec<f64> = jll.iter().map(|score| (score - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        Ok(exp.into_iter().map(|value| value / total).collect())
    }

    /// Most probable label
    pub fn predict(&self, text: &str) -> Result<String> {
        Ok(self.detect(text)?.label)
    }
}

impl LanguageClassifier for NaiveBayesModel {
    fn detect(&self, text: &str) -> Result<Detection> {
        let proba = self.predict_proba(text)?;
        let (index, confidence) = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, &p)| (index, p))
            .ok_or_else(|| DeskError::Classification("Model has no labels".to_string()))?;

        Ok(Detection {
            label: self.labels[index].clone(),
            confidence,
        })
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn toy_model() -> NaiveBayesModel {
        let json = r#"{
            "labels": ["English", "French"],
            "class_log_prior": [-0.6931471805599453, -0.6931471805599453],
            "feature_log_prob": [
                [-0.10536051565782628, -2.3025850929940455],
                [-2.3025850929940455, -0.10536051565782628]
            ],
            "vocabulary": {"a": 0, "b": 1},
            "ngram_range": [1, 1]
        }"#;
        NaiveBayesModel::from_json(json).unwrap()
    }

    #[test]
    fn test_predict_picks_dominant_features() {
        let model = toy_model();
        assert_eq!(model.predict("aaa").unwrap(), "English");
        assert_eq!(model.predict("B b B").unwrap(), "French");
    }

    #[test]
    fn test_confidence_is_a_probability() {
        let model = toy_model();
        let detection = model.detect("aab").unwrap();
        assert_eq!(detection.label, "English");
        assert!(detection.confidence > 0.5 && detection.confidence <= 1.0);

        let proba = model.predict_proba("aab").unwrap();
        let total: f64 = proba.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ngrams_fall_back_to_prior() {
        let model = toy_model();
        let proba = model.predict_proba("xyz").unwrap();
        assert!((proba[0] - 0.5).abs() < 1e-9);
        assert!(model.labels().contains(&model.predict("xyz").unwrap()));
    }

    #[test]
    fn test_empty_text_is_classification_error() {
        let model = toy_model();
        assert!(matches!(model.detect("   "), Err(DeskError::Classification(_))));
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let json = r#"{
            "labels": ["English", "French"],
            "class_log_prior": [-0.69],
            "feature_log_prob": [[-0.1], [-0.1]],
            "vocabulary": {"a": 0}
        }"#;
        assert!(matches!(NaiveBayesModel::from_json(json), Err(DeskError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let file = dir.child("model.json");
        file.write_str(&serde_json::to_string(&toy_model()).unwrap()).unwrap();

        let model = NaiveBayesModel::from_file(file.path()).unwrap();
        assert_eq!(model.labels, vec!["English", "French"]);
        assert_eq!(model.ngram_range, (1, 1));

        let missing = NaiveBayesModel::from_file(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(DeskError::FileNotFound(_))));
    }
}
