use std::path::Path;

use tracing::{info, info_span, warn, Instrument};

use crate::classify::{ClassifierFactory, Detection, LanguageClassifier};
use crate::config::{Config, GlossConfig};
use crate::error::{DeskError, Result};
use crate::gloss::{GlossAligner, GlossAnnotation};
use crate::languages::{self, Language};
use crate::pdf::PdfExtractor;
use crate::session::{ActiveText, SessionState, Slot};
use crate::translate::{TranslationBackend, TranslatorFactory};

#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub detection: Detection,
    /// The text that was classified
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub target: Language,
    pub text: String,
    pub annotations: Option<Vec<GlossAnnotation>>,
}

#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub customer_language: String,
    pub text: String,
    pub annotations: Option<Vec<GlossAnnotation>>,
}

/// Runs the agent's four actions against a session.
///
/// Each action writes to the session only after every fallible step has
/// succeeded, so a failed action leaves earlier results in place.
pub struct Desk {
    gloss: GlossConfig,
    classifier: Box<dyn LanguageClassifier>,
    translator: Box<dyn TranslationBackend>,
    pdf: PdfExtractor,
}

impl Desk {
    pub fn new(config: Config) -> Result<Self> {
        let classifier = ClassifierFactory::create_classifier(&config.classifier)?;
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        Ok(Self::with_components(&config, classifier, translator))
    }

    pub fn with_components(
        config: &Config,
        classifier: Box<dyn LanguageClassifier>,
        translator: Box<dyn TranslationBackend>,
    ) -> Self {
        Self {
            gloss: config.gloss.clone(),
            classifier,
            translator,
            pdf: PdfExtractor::new(&config.pdf),
        }
    }

    pub fn gloss_enabled(&self) -> bool {
        self.gloss.enabled
    }

    pub fn set_gloss(&mut self, enabled: bool) {
        self.gloss.enabled = enabled;
    }

    /// Labels the configured classifier can answer with
    pub fn classifier_labels(&self) -> Vec<String> {
        self.classifier.labels()
    }

    /// Classify a typed customer message
    pub fn detect_text(
        &self,
        session: &mut SessionState,
        input: &str,
    ) -> Result<DetectionOutcome> {
        let span = info_span!("detect_text", session = %session.id());
        let _enter = span.enter();

        if input.trim().is_empty() {
            return Err(DeskError::Validation("Please enter a message.".to_string()));
        }

        let detection = self.classifier.detect(input)?;
        info!("Detected {} ({:.3})", detection.label, detection.confidence);

        session.set(Slot::DetectedText, input);
        session.set(Slot::LangText, detection.label.as_str());

        Ok(DetectionOutcome {
            detection,
            text: input.to_string(),
        })
    }

    /// Extract text from an uploaded PDF and classify it
    pub fn detect_pdf(
        &self,
        session: &mut SessionState,
        upload: Option<&[u8]>,
    ) -> Result<DetectionOutcome> {
        let span = info_span!("detect_pdf", session = %session.id());
        let _enter = span.enter();

        let bytes = match upload {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Err(DeskError::Validation("Please upload a PDF file.".to_string())),
        };

        let extracted = self.pdf.extract(bytes)?;
        let detection = self.classifier.detect(&extracted)?;
        info!("Detected {} ({:.3}) in PDF text", detection.label, detection.confidence);

        session.set(Slot::DetectedPdf, extracted.as_str());
        session.set(Slot::LangPdf, detection.label.as_str());

        Ok(DetectionOutcome {
            detection,
            text: extracted,
        })
    }

    pub async fn detect_pdf_file<P: AsRef<Path>>(
        &self,
        session: &mut SessionState,
        path: P,
    ) -> Result<DetectionOutcome> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DeskError::Validation(format!(
                "Please upload a PDF file ({} not found).",
                path.display()
            )));
        }
        let bytes = tokio::fs::read(path).await?;
        self.detect_pdf(session, Some(&bytes))
    }

    /// Translate the active customer message into `target`
    pub async fn translate(
        &self,
        session: &mut SessionState,
        target: &str,
    ) -> Result<TranslationOutcome> {
        let span = info_span!("translate", session = %session.id(), target = %target);
        self.translate_active(session, target).instrument(span).await
    }

    async fn translate_active(
        &self,
        session: &mut SessionState,
        target: &str,
    ) -> Result<TranslationOutcome> {
        let detected = session.detected_language().map(str::to_string).ok_or_else(|| {
            DeskError::Validation("Detect the message language first.".to_string())
        })?;
        let target = languages::lookup(target).ok_or_else(|| {
            DeskError::Validation(format!("Unsupported target language: {}", target))
        })?;
        let active = active_text(session)?;

        let text = self.translator.translate(&active, None, target.code).await?;
        info!("Translated {} characters into {}", active.chars().count(), target.name);

        let annotations = if self.gloss.enabled {
            let source_hint = languages::resolve_hint(&detected);
            Some(self.annotate(&active, &text, source_hint.as_deref(), target.code).await)
        } else {
            None
        };

        session.set(Slot::TranslatedMsg, text.as_str());
        session.set_target_language(target);

        Ok(TranslationOutcome {
            target,
            text,
            annotations,
        })
    }

    /// Translate the agent's reply into the customer's language
    pub async fn reply(&self, session: &mut SessionState, reply: &str) -> Result<ReplyOutcome> {
        let span = info_span!("reply", session = %session.id());
        self.reply_to_customer(session, reply).instrument(span).await
    }

    async fn reply_to_customer(
        &self,
        session: &mut SessionState,
        reply: &str,
    ) -> Result<ReplyOutcome> {
        if !session.can_reply() {
            return Err(DeskError::Validation(
                "Translate the customer message before replying.".to_string(),
            ));
        }
        if reply.trim().is_empty() {
            return Err(DeskError::Validation("Please enter a reply.".to_string()));
        }
        let active = active_text(session)?;

        let customer_language = self.translator.detect_language(&active).await?;
        info!("Customer language is {}", customer_language);

        let text = self.translator.translate(reply, None, &customer_language).await?;

        let annotations = if self.gloss.enabled {
            let agent_language = session.target_language().map(|language| language.code);
            Some(self.annotate(reply, &text, agent_language, &customer_language).await)
        } else {
            None
        };

        session.set(Slot::TranslatedReply, text.as_str());

        Ok(ReplyOutcome {
            customer_language,
            text,
            annotations,
        })
    }

    async fn annotate(
        &self,
        source_text: &str,
        target_text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Vec<GlossAnnotation> {
        let aligner = GlossAligner::new(self.translator.as_ref(), self.gloss.progress);
        let annotations = aligner
            .annotate(source_text, target_text, source_lang, target_lang)
            .await;
        let unmatched = annotations.iter().filter(|a| a.source_word.is_none()).count();
        if unmatched > 0 {
            warn!("{} translated words have no positional source word", unmatched);
        }
        annotations
    }
}

fn active_text(session: &SessionState) -> Result<String> {
    match session.active_text() {
        ActiveText::FromText(text) | ActiveText::FromPdf(text) => Ok(text),
        ActiveText::None => Err(DeskError::Validation(
            "No customer message to work on.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::classify::MockLanguageClassifier;
    use crate::gloss::SAME_AS_ORIGINAL;
    use crate::pdf::tests::text_pdf;
    use crate::translate::fake::PhrasebookTranslator;

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.gloss.progress = false;
        config
    }

    fn french_classifier() -> MockLanguageClassifier {
        let mut classifier = MockLanguageClassifier::new();
        classifier.expect_detect().returning(|_| {
            Ok(Detection {
                label: "fr".to_string(),
                confidence: 0.93,
            })
        });
        classifier
    }

    fn desk(classifier: MockLanguageClassifier, translator: PhrasebookTranslator) -> Desk {
        Desk::with_components(&quiet_config(), Box::new(classifier), Box::new(translator))
    }

    fn bonjour_phrasebook() -> PhrasebookTranslator {
        PhrasebookTranslator::default()
            .with("Bonjour", "en", "Hello")
            .with("Thanks", "fr", "Merci")
            .detecting("fr")
    }

    #[test]
    fn test_blank_message_rejected_without_classifying() {
        let mut classifier = MockLanguageClassifier::new();
        classifier.expect_detect().times(0);
        let desk = desk(classifier, PhrasebookTranslator::default());
        let mut session = SessionState::new();

        let err = desk.detect_text(&mut session, "  \n").unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
        assert!(!session.has_detection());
    }

    #[test]
    fn test_detect_text_stores_message_and_label() {
        let desk = desk(french_classifier(), PhrasebookTranslator::default());
        let mut session = SessionState::new();

        let outcome = desk.detect_text(&mut session, "Bonjour").unwrap();
        assert_eq!(outcome.detection.label, "fr");
        assert_eq!(session.get(Slot::DetectedText), "Bonjour");
        assert_eq!(session.get(Slot::LangText), "fr");
    }

    #[test]
    fn test_classifier_failure_leaves_state() {
        let mut classifier = MockLanguageClassifier::new();
        classifier
            .expect_detect()
            .returning(|_| Err(DeskError::Classification("model rejected input".to_string())));
        let desk = desk(classifier, PhrasebookTranslator::default());
        let mut session = SessionState::new();

        let err = desk.detect_text(&mut session, "???").unwrap_err();
        assert!(matches!(err, DeskError::Classification(_)));
        assert_eq!(session.get(Slot::DetectedText), "");
    }

    #[test]
    fn test_detect_pdf_paths() {
        let desk = desk(french_classifier(), PhrasebookTranslator::default());
        let mut session = SessionState::new();

        let missing = desk.detect_pdf(&mut session, None).unwrap_err();
        assert!(matches!(missing, DeskError::Validation(_)));

        let broken = desk.detect_pdf(&mut session, Some(&b"%PDF-garbage"[..])).unwrap_err();
        assert!(matches!(broken, DeskError::Extraction(_)));
        assert!(!session.has_detection());

        let outcome = desk
            .detect_pdf(&mut session, Some(text_pdf(&["Bonjour"]).as_slice()))
            .unwrap();
        assert_eq!(outcome.text, "Bonjour");
        assert_eq!(session.get(Slot::DetectedPdf), "Bonjour");
        assert_eq!(session.get(Slot::LangPdf), "fr");
    }

    #[tokio::test]
    async fn test_translate_requires_detection() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();

        let err = desk.translate(&mut session, "English").await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_target() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();

        let err = desk.translate(&mut session, "Klingon").await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_translate_with_glosses() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();

        let outcome = desk.translate(&mut session, "English").await.unwrap();
        assert_eq!(outcome.text, "Hello");
        let annotations = outcome.annotations.unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].word, "Hello");
        assert_eq!(annotations[0].title(), "Bonjour → Hello");
        assert_eq!(session.get(Slot::TranslatedMsg), "Hello");
        assert_eq!(session.target_language().map(|l| l.code), Some("en"));
    }

    #[tokio::test]
    async fn test_typed_text_wins_over_pdf() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_pdf(&mut session, Some(text_pdf(&["Madame"]).as_slice())).unwrap();
        desk.detect_text(&mut session, "Bonjour").unwrap();

        let outcome = desk.translate(&mut session, "en").await.unwrap();
        assert_eq!(outcome.text, "Hello");
    }

    #[tokio::test]
    async fn test_translate_failure_keeps_previous_translation() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();
        desk.translate(&mut session, "English").await.unwrap();

        let err = desk.translate(&mut session, "German").await.unwrap_err();
        assert!(matches!(err, DeskError::Translation(_)));
        assert_eq!(session.get(Slot::TranslatedMsg), "Hello");
        assert_eq!(session.get(Slot::DetectedText), "Bonjour");
    }

    #[tokio::test]
    async fn test_reply_requires_translation() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();

        let err = desk.reply(&mut session, "Thanks").await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
        assert_eq!(session.get(Slot::TranslatedReply), "");
    }

    #[tokio::test]
    async fn test_reply_goes_back_to_customer_language() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();
        desk.translate(&mut session, "English").await.unwrap();

        let outcome = desk.reply(&mut session, "Thanks").await.unwrap();
        assert_eq!(outcome.customer_language, "fr");
        assert_eq!(outcome.text, "Merci");
        assert_eq!(outcome.annotations.unwrap()[0].title(), "Thanks → Merci");
        assert_eq!(session.get(Slot::TranslatedReply), "Merci");
    }

    #[tokio::test]
    async fn test_blank_reply_rejected() {
        let desk = desk(french_classifier(), bonjour_phrasebook());
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();
        desk.translate(&mut session, "English").await.unwrap();
        desk.reply(&mut session, "Thanks").await.unwrap();

        let err = desk.reply(&mut session, " \t ").await.unwrap_err();
        assert!(matches!(err, DeskError::Validation(_)));
        assert_eq!(session.get(Slot::TranslatedReply), "Merci");
    }

    #[tokio::test]
    async fn test_gloss_lookups_carry_language_hints() {
        let mut classifier = MockLanguageClassifier::new();
        classifier.expect_detect().returning(|_| {
            Ok(Detection {
                label: "French".to_string(),
                confidence: 0.88,
            })
        });
        let translator = Arc::new(
            PhrasebookTranslator::default()
                .with("Bonjour Madame", "de", "Guten Tag")
                .with("Bonjour", "de", "Guten")
                .with("Madame", "de", "Tag")
                .with("Danke", "fr", "Merci")
                .detecting("fr"),
        );
        let desk = Desk::with_components(
            &quiet_config(),
            Box::new(classifier),
            Box::new(Arc::clone(&translator)),
        );
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour Madame").unwrap();
        desk.translate(&mut session, "German").await.unwrap();
        desk.reply(&mut session, "Danke").await.unwrap();

        let request = |text: &str, source: Option<&str>, target: &str| {
            (text.to_string(), source.map(str::to_string), target.to_string())
        };
        assert_eq!(
            translator.requests(),
            vec![
                request("Bonjour Madame", None, "de"),
                request("Bonjour", Some("fr"), "de"),
                request("Madame", Some("fr"), "de"),
                request("Danke", None, "fr"),
                request("Danke", Some("de"), "fr"),
            ]
        );
    }

    #[tokio::test]
    async fn test_reply_glosses_degrade_to_sentinel() {
        let translator = PhrasebookTranslator::default()
            .with("Bonjour", "en", "Hello")
            .with("Thank you", "fr", "Merci beaucoup")
            .detecting("fr");
        let desk = desk(french_classifier(), translator);
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();
        desk.translate(&mut session, "English").await.unwrap();

        let outcome = desk.reply(&mut session, "Thank you").await.unwrap();
        let tooltips: Vec<String> = outcome
            .annotations
            .unwrap()
            .iter()
            .map(|a| a.tooltip_text().to_string())
            .collect();
        assert_eq!(tooltips, vec![SAME_AS_ORIGINAL, SAME_AS_ORIGINAL]);
    }

    #[tokio::test]
    async fn test_reply_detection_failure_keeps_state() {
        let translator = PhrasebookTranslator::default().with("Bonjour", "en", "Hello");
        let desk = desk(french_classifier(), translator);
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();
        desk.translate(&mut session, "English").await.unwrap();

        let err = desk.reply(&mut session, "Thanks").await.unwrap_err();
        assert!(matches!(err, DeskError::Translation(_)));
        assert_eq!(session.get(Slot::TranslatedMsg), "Hello");
        assert_eq!(session.get(Slot::TranslatedReply), "");
    }

    #[tokio::test]
    async fn test_gloss_can_be_switched_off() {
        let mut desk = desk(french_classifier(), bonjour_phrasebook());
        desk.set_gloss(false);
        let mut session = SessionState::new();
        desk.detect_text(&mut session, "Bonjour").unwrap();

        let outcome = desk.translate(&mut session, "English").await.unwrap();
        assert!(outcome.annotations.is_none());
    }
}
