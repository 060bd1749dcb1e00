//! Interactive agent console.
//!
//! One shell run is one session: every command reads and updates the same
//! [`SessionState`] until `reset` or `quit`. Failed commands print their error
//! and the loop carries on with the session untouched.

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::desk::Desk;
use crate::error::{DeskError, Result};
use crate::gloss::GlossAnnotation;
use crate::languages;
use crate::render;
use crate::session::{SessionState, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Detect(String),
    Pdf(PathBuf),
    Translate(String),
    Reply(String),
    State,
    Languages,
    Gloss(bool),
    Html(bool),
    Reset,
    Help,
    Quit,
}

fn parse_switch(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(DeskError::Validation(format!("Usage: {} on|off", name))),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_lowercase().as_str() {
            "detect" => Ok(Command::Detect(rest.to_string())),
            "pdf" => Ok(Command::Pdf(PathBuf::from(rest))),
            "translate" => Ok(Command::Translate(rest.to_string())),
            "reply" => Ok(Command::Reply(rest.to_string())),
            "state" => Ok(Command::State),
            "languages" => Ok(Command::Languages),
            "gloss" => parse_switch("gloss", rest).map(Command::Gloss),
            "html" => parse_switch("html", rest).map(Command::Html),
            "reset" => Ok(Command::Reset),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(DeskError::Validation(format!(
                "Unknown command '{}'. Type 'help' for the list of commands.",
                other
            ))),
        }
    }
}

enum Step {
    Continue(String),
    Quit,
}

pub struct Shell {
    desk: Desk,
    session: SessionState,
    html: bool,
}

impl Shell {
    pub fn new(desk: Desk) -> Self {
        Self {
            desk,
            session: SessionState::new(),
            html: false,
        }
    }

    /// Render glossed text as HTML spans instead of a word table
    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Run against the process's stdin and stdout
    pub async fn run(&mut self) -> Result<()> {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        self.run_lines(stdin, &mut stdout).await
    }

    pub async fn run_lines<R, W>(&mut self, reader: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        info!("Session {} started", self.session.id());
        writeln!(out, "Customer Support Language Assistant. Type 'help' for commands.")?;

        let mut lines = reader.lines();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match self.execute(&line).await {
                Ok(Step::Continue(output)) => writeln!(out, "{}", output)?,
                Ok(Step::Quit) => break,
                Err(e) => {
                    debug!("Command failed: {:?}", e);
                    writeln!(out, "Error ({}): {}", e.kind(), e)?;
                }
            }
        }

        info!("Session {} ended", self.session.id());
        Ok(())
    }

    async fn execute(&mut self, line: &str) -> Result<Step> {
        let output = match Command::parse(line)? {
            Command::Detect(text) => {
                let outcome = self.desk.detect_text(&mut self.session, &text)?;
                render::detection_line("Detected Language", &outcome.detection)
            }
            Command::Pdf(path) => {
                if path.as_os_str().is_empty() {
                    return Err(DeskError::Validation("Please upload a PDF file.".to_string()));
                }
                let outcome = self.desk.detect_pdf_file(&mut self.session, &path).await?;
                format!(
                    "{}\nExtracted PDF Text:\n{}",
                    render::detection_line("PDF Language", &outcome.detection),
                    outcome.text
                )
            }
            Command::Translate(target) => {
                let outcome = self.desk.translate(&mut self.session, &target).await?;
                let heading = format!("Translated Message ({}):", outcome.target.name);
                self.present(&heading, &outcome.text, outcome.annotations.as_deref())
            }
            Command::Reply(reply) => {
                let outcome = self.desk.reply(&mut self.session, &reply).await?;
                let heading = format!(
                    "Reply in Customer's Language ({}):",
                    languages::code_to_name(&outcome.customer_language)
                );
                self.present(&heading, &outcome.text, outcome.annotations.as_deref())
            }
            Command::State => self.describe_state(),
            Command::Languages => languages::all()
                .map(|language| format!("  {:<12} {}", language.name, language.code))
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Gloss(enabled) => {
                self.desk.set_gloss(enabled);
                format!("Word glosses {}", if enabled { "on" } else { "off" })
            }
            Command::Html(enabled) => {
                self.html = enabled;
                format!("HTML output {}", if enabled { "on" } else { "off" })
            }
            Command::Reset => {
                self.session.reset();
                info!("Session reset, new id {}", self.session.id());
                "Session cleared.".to_string()
            }
            Command::Help => self.help(),
            Command::Quit => return Ok(Step::Quit),
        };
        Ok(Step::Continue(output))
    }

    fn present(
        &self,
        heading: &str,
        text: &str,
        annotations: Option<&[GlossAnnotation]>,
    ) -> String {
        match annotations {
            Some(annotations) if self.html => {
                format!("{}\n{}", heading, render::annotations_html(annotations))
            }
            Some(annotations) if !annotations.is_empty() => {
                format!("{}\n{}\n\n{}", heading, text, render::annotations_table(annotations))
            }
            _ => format!("{}\n{}", heading, text),
        }
    }

    fn describe_state(&self) -> String {
        let mut lines = vec![
            format!(
                "Session {} (started {})",
                self.session.id(),
                self.session.started_at().to_rfc3339()
            ),
            format!("Active text: {}", self.session.active_text().origin()),
        ];
        for slot in Slot::ALL {
            let value = self.session.get(slot);
            let preview: String = value.chars().take(60).collect();
            let ellipsis = if value.chars().count() > 60 { "..." } else { "" };
            lines.push(format!("  {:<17} {}{}", slot.name(), preview.replace('\n', " "), ellipsis));
        }
        if let Some(target) = self.session.target_language() {
            lines.push(format!("  {:<17} {}", "target_language", target.name));
        }

        let labels = self.desk.classifier_labels();
        let mut shown = labels.iter().take(12).cloned().collect::<Vec<_>>().join(", ");
        if labels.len() > 12 {
            shown.push_str(", ...");
        }
        lines.push(format!("Classifier labels ({}): {}", labels.len(), shown));
        lines.join("\n")
    }

    fn help(&self) -> String {
        let mut lines = vec![
            "  detect <text>          Detect the language of a typed message",
            "  pdf <path>             Extract a PDF and detect its language",
        ];
        if self.session.has_detection() {
            lines.push("  translate <language>   Translate the message (name or code)");
        }
        if self.session.can_reply() {
            lines.push("  reply <text>           Translate your reply into the customer's language");
        }
        lines.extend([
            "  state                  Show the session",
            "  languages              List target languages",
            "  gloss on|off           Toggle word glosses",
            "  html on|off            Toggle HTML output for glossed text",
            "  reset                  Start a new session",
            "  quit                   Leave",
        ]);
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Detection, MockLanguageClassifier};
    use crate::config::Config;
    use crate::translate::fake::PhrasebookTranslator;

    fn shell() -> Shell {
        let mut classifier = MockLanguageClassifier::new();
        classifier.expect_detect().returning(|_| {
            Ok(Detection {
                label: "fr".to_string(),
                confidence: 0.9,
            })
        });
        classifier
            .expect_labels()
            .returning(|| vec!["en".to_string(), "fr".to_string()]);
        let translator = PhrasebookTranslator::default()
            .with("Bonjour", "en", "Hello")
            .with("Thanks", "fr", "Merci")
            .detecting("fr");
        let mut config = Config::default();
        config.gloss.progress = false;
        Shell::new(Desk::with_components(&config, Box::new(classifier), Box::new(translator)))
    }

    async fn transcript(shell: &mut Shell, input: &str) -> String {
        let mut out = Vec::new();
        shell
            .run_lines(tokio::io::BufReader::new(input.as_bytes()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("detect  Bonjour Madame ").unwrap(),
            Command::Detect("Bonjour Madame".to_string())
        );
        assert_eq!(
            Command::parse("TRANSLATE English").unwrap(),
            Command::Translate("English".to_string())
        );
        assert_eq!(Command::parse("gloss off").unwrap(), Command::Gloss(false));
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
        assert!(Command::parse("gloss maybe").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[tokio::test]
    async fn test_full_conversation() {
        let mut shell = shell();
        let output = transcript(
            &mut shell,
            "detect Bonjour\ntranslate English\nreply Thanks\nquit\n",
        )
        .await;

        assert!(output.contains("Detected Language: fr (Confidence: 90.00%)"));
        assert!(output.contains("Translated Message (English):\nHello"));
        assert!(output.contains("Bonjour → Hello"));
        assert!(output.contains("Reply in Customer's Language (French):\nMerci"));
        assert_eq!(shell.session().get(Slot::TranslatedReply), "Merci");
    }

    #[tokio::test]
    async fn test_errors_do_not_end_the_session() {
        let mut shell = shell();
        let output = transcript(&mut shell, "reply too early\ndetect Bonjour\nstate\n").await;

        assert!(output
            .contains("Error (validation): Translate the customer message before replying."));
        assert!(output.contains("detected_text     Bonjour"));
        assert!(output.contains("Classifier labels (2): en, fr"));
        assert_eq!(shell.session().get(Slot::LangText), "fr");
    }

    #[tokio::test]
    async fn test_reply_hidden_from_help_until_translated() {
        let mut shell = shell();
        let before = transcript(&mut shell, "help\n").await;
        assert!(!before.contains("reply <text>"));

        let after = transcript(&mut shell, "detect Bonjour\ntranslate en\nhelp\n").await;
        assert!(after.contains("reply <text>"));
    }

    #[tokio::test]
    async fn test_html_output() {
        let mut shell = shell();
        let output = transcript(&mut shell, "html on\ndetect Bonjour\ntranslate en\n").await;
        let span = "<span style=\"padding:4px 6px;\" title=\"Bonjour → Hello\">Hello</span>";
        assert!(output.contains(span));
    }
}
