use crate::classify::Detection;
use crate::gloss::GlossAnnotation;

pub fn detection_line(prefix: &str, detection: &Detection) -> String {
    format!(
        "{}: {} (Confidence: {:.2}%)",
        prefix,
        detection.label,
        detection.confidence * 100.0
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// One hoverable span per word, titles carrying `source → gloss`
pub fn annotations_html(annotations: &[GlossAnnotation]) -> String {
    annotations
        .iter()
        .map(|annotation| {
            format!(
                "<span style=\"padding:4px 6px;\" title=\"{}\">{}</span>",
                escape_html(&annotation.title()),
                escape_html(&annotation.word)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-per-line listing for the terminal
pub fn annotations_table(annotations: &[GlossAnnotation]) -> String {
    let width = annotations
        .iter()
        .map(|annotation| annotation.word.chars().count())
        .max()
        .unwrap_or(0);

    annotations
        .iter()
        .map(|annotation| {
            let padding = width - annotation.word.chars().count();
            format!("  {}{}  ← {}", annotation.word, " ".repeat(padding), annotation.title())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
