use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, info, warn};

use crate::config::PdfConfig;
use crate::error::{DeskError, Result};

/// Turns uploaded PDF bytes into plain text.
///
/// Each line of a page comes out as one line of text, and pages are
/// concatenated in page order with no separator. Layout, tables and columns
/// are not preserved.
pub struct PdfExtractor {
    max_bytes: u64,
}

impl PdfExtractor {
    pub fn new(config: &PdfConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
        }
    }

    pub fn extract(&self, pdf_bytes: &[u8]) -> Result<String> {
        if pdf_bytes.len() as u64 > self.max_bytes {
            return Err(DeskError::Extraction(format!(
                "PDF is {} bytes, limit is {}",
                pdf_bytes.len(),
                self.max_bytes
            )));
        }

        let document = Document::load_mem(pdf_bytes)
            .map_err(|e| DeskError::Extraction(format!("Not a readable PDF: {}", e)))?;

        let pages = document.get_pages();
        debug!("PDF has {} pages", pages.len());

        let mut text = String::new();
        for (page_number, page_id) in &pages {
            let page_text = page_text(&document, *page_id)
                .map_err(|e| DeskError::Extraction(format!("Page {}: {}", page_number, e)))?;
            text.push_str(page_text.trim_end_matches(['\r', '\n']));
        }

        if text.trim().is_empty() {
            return Err(DeskError::Extraction("PDF contains no extractable text".to_string()));
        }

        info!("Extracted {} characters from {} pages", text.chars().count(), pages.len());
        Ok(text)
    }
}

/// Walk a page's content stream, breaking lines on text positioning
fn page_text(document: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings = document
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(document).map(|encoding| (name, encoding)))
        .collect::<lopdf::Result<BTreeMap<Vec<u8>, Encoding>>>()?;
    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut text = String::new();
    let mut encoding = None;
    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "Tf" => {
                encoding = match operands.first() {
                    Some(font) => encodings.get(font.as_name()?),
                    None => None,
                };
            }
            "Tj" | "TJ" => show_text(&mut text, encoding, operands)?,
            "'" => {
                line_break(&mut text);
                show_text(&mut text, encoding, operands)?;
            }
            "\"" => {
                line_break(&mut text);
                // aw ac string
                show_text(&mut text, encoding, operands.get(2..).unwrap_or_default())?;
            }
            "Td" | "TD" => {
                let dy = operands.get(1).and_then(|dy| dy.as_float().ok()).unwrap_or(0.0);
                if dy != 0.0 {
                    line_break(&mut text);
                } else if !text.is_empty() && !text.ends_with(char::is_whitespace) {
                    text.push(' ');
                }
            }
            "T*" | "ET" => line_break(&mut text),
            _ => {}
        }
    }
    Ok(text)
}

fn show_text(
    text: &mut String,
    encoding: Option<&Encoding>,
    operands: &[Object],
) -> lopdf::Result<()> {
    let Some(encoding) = encoding else {
        warn!("Skipping text shown without a known font encoding");
        return Ok(());
    };
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => show_text(text, Some(encoding), items)?,
            // Large negative kerning in a TJ array separates words
            Object::Integer(adjust) if *adjust < -100 => text.push(' '),
            Object::Real(adjust) if *adjust < -100.0 => text.push(' '),
            _ => {}
        }
    }
    Ok(())
}

fn line_break(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}
