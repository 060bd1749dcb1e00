//! Word-level hover glosses for translated text.
//!
//! The aligner pairs words **by position only**: word `i` of the source is
//! assumed to correspond to word `i` of the translation. This is an
//! approximation that breaks whenever the two languages differ in word order
//! or word count, and punctuation stays attached to words. It exists to help an
//! agent spot-check a machine translation, not to produce a real alignment.

use std::collections::HashMap;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::translate::TranslationBackend;

pub const SAME_AS_ORIGINAL: &str = "(same as original)";
pub const NO_MATCH: &str = "(no match)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tooltip {
    /// Word-level translation of the aligned source word
    Gloss(String),
    /// Gloss came back unchanged, or the lookup failed
    SameAsOriginal,
    /// Target word past the end of the source words
    NoMatch,
}

impl Tooltip {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gloss(gloss) => gloss,
            Self::SameAsOriginal => SAME_AS_ORIGINAL,
            Self::NoMatch => NO_MATCH,
        }
    }
}

/// One target word and what to show when hovering it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossAnnotation {
    pub word: String,
    pub source_word: Option<String>,
    pub tooltip: Tooltip,
}

impl GlossAnnotation {
    pub fn tooltip_text(&self) -> &str {
        self.tooltip.as_str()
    }

    /// Hover title in the form `source → gloss`, or the bare sentinel
    pub fn title(&self) -> String {
        match &self.source_word {
            Some(source) => format!("{} → {}", source, self.tooltip.as_str()),
            None => self.tooltip.as_str().to_string(),
        }
    }
}

pub struct GlossAligner<'a> {
    backend: &'a dyn TranslationBackend,
    show_progress: bool,
}

impl<'a> GlossAligner<'a> {
    pub fn new(backend: &'a dyn TranslationBackend, show_progress: bool) -> Self {
        Self {
            backend,
            show_progress,
        }
    }

    /// Annotate every word of `target_text`. Output length always equals
    /// the number of whitespace-separated words in the target.
    pub async fn annotate(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Vec<GlossAnnotation> {
        let source_words: Vec<&str> = source_text.split_whitespace().collect();
        let target_words: Vec<&str> = target_text.split_whitespace().collect();
        let paired = source_words.len().min(target_words.len());

        let progress = if self.show_progress && paired > 0 {
            let pb = ProgressBar::new(paired as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} glossing [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut glossed: HashMap<&str, Tooltip> = HashMap::new();
        let mut annotations = Vec::with_capacity(target_words.len());

        for (&source_word, &target_word) in source_words.iter().zip(&target_words) {
            progress.set_message(source_word.to_string());

            let cached = glossed.get(source_word).cloned();
            let tooltip = match cached {
                Some(cached) => cached,
                None => {
                    let tooltip = self.lookup(source_word, source_lang, target_lang).await;
                    if let Some(tooltip) = &tooltip {
                        glossed.insert(source_word, tooltip.clone());
                    }
                    tooltip.unwrap_or(Tooltip::SameAsOriginal)
                }
            };

            annotations.push(GlossAnnotation {
                word: target_word.to_string(),
                source_word: Some(source_word.to_string()),
                tooltip,
            });
            progress.inc(1);
        }
        progress.finish_and_clear();

        for &target_word in &target_words[paired..] {
            annotations.push(GlossAnnotation {
                word: target_word.to_string(),
                source_word: None,
                tooltip: Tooltip::NoMatch,
            });
        }

        annotations
    }

    /// `None` when the lookup failed; failures are not worth caching
    async fn lookup(
        &self,
        word: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Option<Tooltip> {
        match self.backend.translate(word, source_lang, target_lang).await {
            Ok(meaning) if meaning.trim().to_lowercase() == word.trim().to_lowercase() => {
                Some(Tooltip::SameAsOriginal)
            }
            Ok(meaning) => Some(Tooltip::Gloss(meaning)),
            Err(e) => {
                debug!("Gloss lookup for '{}' failed: {}", word, e);
                None
            }
        }
    }
}
