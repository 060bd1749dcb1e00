// Language classification
//
// Detection is answered by one of two backends, chosen in configuration:
// - Model: a pre-trained naive Bayes model deserialized from disk at startup
// - Whatlang: the built-in trigram detector, for setups without a model file

pub mod naive_bayes;
pub mod trigram;

use tracing::info;

use crate::config::{ClassifierBackend, ClassifierConfig};
use crate::error::Result;

pub use naive_bayes::NaiveBayesModel;
pub use trigram::WhatlangClassifier;

/// Predicted language label with the classifier's confidence in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f64,
}

/// Black-box language classifier
#[cfg_attr(test, mockall::automock)]
pub trait LanguageClassifier: Send + Sync {
    /// Label the language of non-empty text
    fn detect(&self, text: &str) -> Result<Detection>;

    /// Labels this classifier can produce, if it knows them
    fn labels(&self) -> Vec<String>;
}

/// Factory for creating classifier instances
pub struct ClassifierFactory;

impl ClassifierFactory {
    pub fn create_classifier(config: &ClassifierConfig) -> Result<Box<dyn LanguageClassifier>> {
        match config.backend {
            ClassifierBackend::Model => {
                let model = NaiveBayesModel::from_file(&config.model_path)?;
                info!(
                    "Loaded language model from {} ({} labels)",
                    config.model_path,
                    model.labels.len()
                );
                Ok(Box::new(model))
            }
            ClassifierBackend::Whatlang => {
                info!("Using built-in whatlang language detector");
                Ok(Box::new(WhatlangClassifier::new()))
            }
        }
    }
}
