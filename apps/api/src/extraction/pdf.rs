use bytes::Bytes;
use tracing::warn;

use super::MIN_TEXT_CHARS;

/// Extracts text from a PDF. Never fails: unreadable and image-only documents
/// come back as a placeholder describing the problem, so scoring still runs on
/// the degraded input.
pub async fn extract_pdf_text(bytes: Bytes) -> String {
    let size = bytes.len();
    // pdf-extract is CPU bound and can panic on malformed input.
    let parsed =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match parsed {
        Ok(Ok(text)) => finish_pdf_text(&text, size),
        Ok(Err(e)) => {
            warn!("PDF parsing failed ({size} bytes): {e}");
            unreadable_placeholder(&e.to_string())
        }
        Err(e) => {
            warn!("PDF parser aborted ({size} bytes): {e}");
            unreadable_placeholder("the parser aborted")
        }
    }
}

fn finish_pdf_text(text: &str, size: usize) -> String {
    let text = text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        warn!(
            "PDF yielded {} characters of text ({size} bytes), treating as image-based",
            text.chars().count()
        );
        return image_based_placeholder(size);
    }
    text.to_string()
}

fn image_based_placeholder(size: usize) -> String {
    format!(
        "[PDF text extraction returned no readable text ({size} bytes). \
         The document is likely image-based or scanned. \
         Upload a text-based PDF or DOCX for a full analysis.]"
    )
}

fn unreadable_placeholder(reason: &str) -> String {
    format!(
        "[PDF could not be parsed: {reason}. \
         The file may be corrupt or password-protected. \
         Re-export it as a standard PDF and upload it again.]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_becomes_image_placeholder() {
        let out = finish_pdf_text("  \n ab \n", 2048);
        assert!(out.contains("image-based"));
        assert!(out.contains("2048 bytes"));
    }

    #[test]
    fn test_real_text_is_trimmed_and_kept() {
        let out = finish_pdf_text("\n Jane Doe, Senior Engineer \n", 100);
        assert_eq!(out, "Jane Doe, Senior Engineer");
    }

    #[tokio::test]
    async fn test_garbage_bytes_degrade_to_placeholder() {
        let out = extract_pdf_text(Bytes::from_static(b"this is not a pdf at all")).await;
        assert!(out.starts_with("[PDF "), "got: {out}");
    }
}
