use std::io::{Cursor, Read};

use roxmltree::{Document, Node};
use zip::ZipArchive;

use super::{ExtractionError, MIN_TEXT_CHARS};

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";

/// Decompressed size cap for `word/document.xml`. The upload limit applies to
/// the compressed archive, which can inflate far beyond it.
pub const MAX_DOCUMENT_XML_BYTES: usize = 50 * 1024 * 1024;

/// Extracts the body text of a DOCX file, one line per paragraph.
///
/// Unlike PDFs, an empty result is a hard `EmptyDocument` failure.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    extract_with_limit(bytes, MAX_DOCUMENT_XML_BYTES)
}

fn extract_with_limit(bytes: &[u8], xml_limit: usize) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Unknown(format!("DOCX archive is unreadable: {e}")))?;

    let mut raw = Vec::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Unknown(format!("DOCX has no {DOCUMENT_PART}: {e}")))?
        .take(xml_limit as u64 + 1)
        .read_to_end(&mut raw)
        .map_err(|e| ExtractionError::Unknown(format!("failed to read {DOCUMENT_PART}: {e}")))?;
    if raw.len() > xml_limit {
        return Err(ExtractionError::TooLarge {
            size: raw.len(),
            limit: xml_limit,
        });
    }
    let xml = String::from_utf8(raw)
        .map_err(|e| ExtractionError::Unknown(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;

    let text = document_xml_to_text(&xml)?;
    if text.chars().count() < MIN_TEXT_CHARS {
        return Err(ExtractionError::EmptyDocument);
    }
    Ok(text)
}

fn document_xml_to_text(xml: &str) -> Result<String, ExtractionError> {
    let doc = Document::parse(xml)
        .map_err(|e| ExtractionError::Unknown(format!("malformed {DOCUMENT_PART}: {e}")))?;

    let mut out = String::new();
    for node in doc.descendants().filter(|n| is_word_element(n)) {
        match node.tag_name().name() {
            "p" => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            "t" => out.push_str(node.text().unwrap_or_default()),
            // w:tab also appears inside paragraph properties as a tab stop
            "tab" if node.parent().is_some_and(|p| p.tag_name().name() == "r") => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            _ => {}
        }
    }
    Ok(out.trim().to_string())
}

fn is_word_element(node: &Node) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(WORD_NS)
}
