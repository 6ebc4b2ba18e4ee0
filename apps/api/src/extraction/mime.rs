use std::path::Path;

use super::ExtractionError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Declared types that say nothing about the content. These fall through to
/// the file extension.
const GENERIC_MIMES: &[&str] = &[
    "application/octet-stream",
    "binary/octet-stream",
    "application/x-download",
    "application/force-download",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Picks the parser from the declared MIME type, falling back to the
    /// extension of `file_key` when the type is absent or generic.
    pub fn resolve(declared_mime: Option<&str>, file_key: &str) -> Result<Self, ExtractionError> {
        let declared = declared_mime
            .map(|m| m.split(';').next().unwrap_or_default().trim().to_lowercase())
            .unwrap_or_default();

        match declared.as_str() {
            PDF_MIME => return Ok(DocumentKind::Pdf),
            DOCX_MIME => return Ok(DocumentKind::Docx),
            "" => {}
            m if GENERIC_MIMES.contains(&m) => {}
            other => return Err(ExtractionError::UnsupportedType(other.to_string())),
        }

        let extension = Path::new(file_key)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            _ => Err(ExtractionError::UnsupportedType(if declared.is_empty() {
                file_key.to_string()
            } else {
                declared
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_types_win() {
        assert_eq!(
            DocumentKind::resolve(Some(PDF_MIME), "resume.docx"),
            Ok(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::resolve(Some(DOCX_MIME), "abc123"),
            Ok(DocumentKind::Docx)
        );
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        assert_eq!(
            DocumentKind::resolve(Some("Application/PDF; charset=binary"), "k"),
            Ok(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_generic_or_missing_type_uses_extension() {
        assert_eq!(
            DocumentKind::resolve(None, "uploads/cv.PDF"),
            Ok(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::resolve(Some("application/octet-stream"), "cv.docx"),
            Ok(DocumentKind::Docx)
        );
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(
            DocumentKind::resolve(Some("application/msword"), "cv.doc"),
            Err(ExtractionError::UnsupportedType("application/msword".to_string()))
        );
        assert_eq!(
            DocumentKind::resolve(None, "cv.txt"),
            Err(ExtractionError::UnsupportedType("cv.txt".to_string()))
        );
        assert!(DocumentKind::resolve(Some("application/octet-stream"), "abc").is_err());
    }
}
