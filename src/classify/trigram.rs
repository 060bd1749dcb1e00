use whatlang::{Detector, Lang};

use super::{Detection, LanguageClassifier};
use crate::error::{DeskError, Result};

/// Whatlang-based language detector
pub struct WhatlangClassifier {
    detector: Detector,
}

impl WhatlangClassifier {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }

    /// Convert whatlang Lang to ISO 639-1 code, keeping the 639-3 code otherwise
    fn lang_to_code(lang: Lang) -> &'static str {
        match lang {
            Lang::Eng => "en",
            Lang::Fra => "fr",
            Lang::Spa => "es",
            Lang::Deu => "de",
            Lang::Ita => "it",
            Lang::Rus => "ru",
            Lang::Por => "pt",
            Lang::Nld => "nl",
            Lang::Tur => "tr",
            Lang::Swe => "sv",
            Lang::Dan => "da",
            Lang::Ell => "el",
            Lang::Ara => "ar",
            Lang::Hin => "hi",
            Lang::Ben => "bn",
            Lang::Guj => "gu",
            Lang::Pan => "pa",
            Lang::Tam => "ta",
            Lang::Tel => "te",
            Lang::Kan => "kn",
            Lang::Mal => "ml",
            Lang::Mar => "mr",
            Lang::Urd => "ur",
            Lang::Ori => "or",
            Lang::Cmn => "zh",
            Lang::Jpn => "ja",
            Lang::Kor => "ko",
            Lang::Pol => "pl",
            Lang::Ukr => "uk",
            Lang::Vie => "vi",
            l => l.code(),
        }
    }
}

impl Default for WhatlangClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageClassifier for WhatlangClassifier {
    fn detect(&self, text: &str) -> Result<Detection> {
        if text.trim().is_empty() {
            return Err(DeskError::Classification(
                "Cannot detect language from empty text".to_string(),
            ));
        }

        let info = self.detector.detect(text).ok_or_else(|| {
            DeskError::Classification("Could not detect language from text".to_string())
        })?;

        Ok(Detection {
            label: Self::lang_to_code(info.lang()).to_string(),
            confidence: info.confidence().clamp(0.0, 1.0),
        })
    }

    fn labels(&self) -> Vec<String> {
        Lang::all().iter().map(|&lang| Self::lang_to_code(lang).to_string()).collect()
    }
}
