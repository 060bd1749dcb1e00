use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::languages::Language;

/// Named values a session remembers between interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    DetectedText,
    DetectedPdf,
    LangText,
    LangPdf,
    TranslatedMsg,
    TranslatedReply,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::DetectedText,
        Slot::DetectedPdf,
        Slot::LangText,
        Slot::LangPdf,
        Slot::TranslatedMsg,
        Slot::TranslatedReply,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slot::DetectedText => "detected_text",
            Slot::DetectedPdf => "detected_pdf",
            Slot::LangText => "lang_text",
            Slot::LangPdf => "lang_pdf",
            Slot::TranslatedMsg => "translated_msg",
            Slot::TranslatedReply => "translated_reply",
        }
    }
}

/// The customer message translate and reply work on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveText {
    FromText(String),
    FromPdf(String),
    None,
}

impl ActiveText {
    pub fn text(&self) -> Option<&str> {
        match self {
            ActiveText::FromText(text) | ActiveText::FromPdf(text) => Some(text),
            ActiveText::None => None,
        }
    }

    pub fn origin(&self) -> &'static str {
        match self {
            ActiveText::FromText(_) => "typed message",
            ActiveText::FromPdf(_) => "PDF",
            ActiveText::None => "none",
        }
    }
}

/// Typed input wins over PDF text when both are present
pub fn resolve_active_text(detected_text: &str, detected_pdf: &str) -> ActiveText {
    if !detected_text.is_empty() {
        ActiveText::FromText(detected_text.to_string())
    } else if !detected_pdf.is_empty() {
        ActiveText::FromPdf(detected_pdf.to_string())
    } else {
        ActiveText::None
    }
}

/// Ephemeral state of one agent's session. Starts empty; lives as long as
/// the session and is never persisted.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    started_at: DateTime<Utc>,
    slots: HashMap<Slot, String>,
    target_language: Option<Language>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            slots: HashMap::new(),
            target_language: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Slot value, empty when never set
    pub fn get(&self, slot: Slot) -> &str {
        self.slots.get(&slot).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, slot: Slot, value: impl Into<String>) {
        self.slots.insert(slot, value.into());
    }

    /// Start over as a brand new session
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn active_text(&self) -> ActiveText {
        resolve_active_text(self.get(Slot::DetectedText), self.get(Slot::DetectedPdf))
    }

    /// Label from the most relevant detection, typed text first
    pub fn detected_language(&self) -> Option<&str> {
        [Slot::LangText, Slot::LangPdf]
            .into_iter()
            .map(|slot| self.get(slot))
            .find(|label| !label.is_empty())
    }

    pub fn has_detection(&self) -> bool {
        self.detected_language().is_some()
    }

    /// Replying needs a translated customer message
    pub fn can_reply(&self) -> bool {
        !self.get(Slot::TranslatedMsg).is_empty()
    }

    pub fn target_language(&self) -> Option<Language> {
        self.target_language
    }

    pub fn set_target_language(&mut self, language: Language) {
        self.target_language = Some(language);
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::lookup;

    #[test]
    fn test_new_session_is_empty() {
        let session = SessionState::new();
        for slot in Slot::ALL {
            assert_eq!(session.get(slot), "");
        }
        assert_eq!(session.active_text(), ActiveText::None);
        assert!(!session.has_detection());
        assert!(!session.can_reply());
    }

    #[test]
    fn test_typed_text_takes_precedence() {
        assert_eq!(
            resolve_active_text("typed", "from pdf"),
            ActiveText::FromText("typed".to_string())
        );
        assert_eq!(
            resolve_active_text("", "from pdf"),
            ActiveText::FromPdf("from pdf".to_string())
        );
        assert_eq!(resolve_active_text("", ""), ActiveText::None);
    }

    #[test]
    fn test_detected_language_order() {
        let mut session = SessionState::new();
        session.set(Slot::LangPdf, "de");
        assert_eq!(session.detected_language(), Some("de"));
        session.set(Slot::LangText, "fr");
        assert_eq!(session.detected_language(), Some("fr"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = SessionState::new();
        let old_id = session.id();
        session.set(Slot::DetectedText, "Bonjour");
        session.set(Slot::TranslatedMsg, "Hello");
        session.set_target_language(lookup("English").unwrap());
        assert!(session.can_reply());

        session.reset();
        assert_ne!(session.id(), old_id);
        assert_eq!(session.get(Slot::DetectedText), "");
        assert!(!session.can_reply());
        assert!(session.target_language().is_none());
    }
}
