//! Turns a raw provider reply into an `AnalysisResult`.

use serde_json::Value;
use thiserror::Error;

use crate::models::analysis::AnalysisResult;

const LIST_FIELDS: &[&str] = &[
    "grammarIssues",
    "formattingTips",
    "keywordsMatched",
    "keywordsMissing",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Carries the raw provider text, unmodified.
    #[error("provider response is not a valid analysis: {0}")]
    Malformed(String),
}

/// Parses a provider reply, tolerating a surrounding markdown code fence.
///
/// Only `resumeScore` is required; any JSON object carrying a usable score is
/// accepted. Ranges are not checked here. List fields that are absent or
/// `null` default to empty, and list items that are not strings are kept as
/// their JSON text. Provenance and id fields from the provider are discarded.
pub fn normalize(raw: &str) -> Result<AnalysisResult, ParseError> {
    let malformed = || ParseError::Malformed(raw.to_string());

    let mut value: Value = serde_json::from_str(strip_json_fences(raw)).map_err(|_| malformed())?;
    let object = value.as_object_mut().ok_or_else(malformed)?;

    let score = object
        .get("resumeScore")
        .and_then(score_from_value)
        .ok_or_else(malformed)?;
    object.insert("resumeScore".to_string(), Value::from(score));
    object.retain(|key, v| !v.is_null() && key != "id" && key != "metadata");
    for field in LIST_FIELDS {
        if let Some(list) = object.get_mut(*field) {
            *list = coerce_string_list(list.take());
        }
    }

    let mut result: AnalysisResult = serde_json::from_value(value).map_err(|_| malformed())?;
    dedup_in_place(&mut result.keywords_matched);
    dedup_in_place(&mut result.keywords_missing);
    Ok(result)
}

/// Strips one leading ```` ``` ```` / ```` ```json ```` fence and one trailing
/// ```` ``` ```` fence, then trims.
pub fn strip_json_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest);
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Accepts integers, floats (rounded) and numeric strings.
fn score_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

/// A bare string becomes a one-item list; other items are rendered as JSON.
fn coerce_string_list(value: Value) -> Value {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    Value::Array(
        items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            })
            .collect(),
    )
}

/// Keyword lists are sets with display order; drop repeats, keep first occurrence.
fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{AtsCompatibility, AtsRating};

    const BARE: &str = r#"{
        "resumeScore": 78,
        "grammarIssues": ["Missing period in summary"],
        "formattingTips": ["Use consistent date formats"],
        "keywordsMatched": ["rust", "kubernetes"],
        "keywordsMissing": ["terraform"],
        "atsCompatibility": "Good"
    }"#;

    #[test]
    fn test_uppercase_json_fence_tag() {
        let fenced = format!("```JSON\n{BARE}\n```");
        assert_eq!(strip_json_fences(&fenced), BARE.trim());
    }

    #[test]
    fn test_reply_with_only_a_closing_fence() {
        assert_eq!(strip_json_fences("{\"resumeScore\": 70}\n```"), "{\"resumeScore\": 70}");
    }

    #[test]
    fn test_unfenced_reply_is_only_trimmed() {
        assert_eq!(strip_json_fences("\n  {\"resumeScore\": 70}  \n"), "{\"resumeScore\": 70}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        assert_eq!(strip_json_fences("```json\n{}"), "{}");
    }

    #[test]
    fn test_fenced_and_bare_parse_identically() {
        let fenced = format!("```json\n{BARE}\n```");
        assert_eq!(normalize(&fenced).unwrap(), normalize(BARE).unwrap());

        let result = normalize(BARE).unwrap();
        assert_eq!(result.resume_score, 78);
        assert_eq!(result.keywords_matched, vec!["rust", "kubernetes"]);
        assert_eq!(
            result.ats_compatibility,
            Some(AtsCompatibility::Rating(AtsRating::Good))
        );
    }

    #[test]
    fn test_missing_score_is_malformed() {
        let raw = r#"{"grammarIssues": []}"#;
        assert_eq!(normalize(raw), Err(ParseError::Malformed(raw.to_string())));
    }

    #[test]
    fn test_non_json_is_malformed() {
        let raw = "I'm sorry, I can't help with that.";
        assert_eq!(normalize(raw), Err(ParseError::Malformed(raw.to_string())));
        assert!(normalize("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        assert!(normalize("42").is_err());
        assert!(normalize(r#""resumeScore: 50""#).is_err());
    }

    #[test]
    fn test_structured_ats_verdict_is_accepted() {
        let raw = r#"{"resumeScore": 82, "grammarIssues": [], "atsCompatibility": {"score": 85, "rating": "Good"}}"#;
        let result = normalize(raw).unwrap();
        assert_eq!(result.resume_score, 82);
        assert_eq!(
            result.ats_compatibility,
            Some(AtsCompatibility::Other(
                serde_json::json!({"score": 85, "rating": "Good"})
            ))
        );
    }

    #[test]
    fn test_list_items_of_any_shape_are_kept() {
        let raw = r#"{"resumeScore": 82, "grammarIssues": [{"issue":"typo","line":3}, "Missing comma", null, 7]}"#;
        let result = normalize(raw).unwrap();
        assert_eq!(
            result.grammar_issues,
            vec![r#"{"issue":"typo","line":3}"#, "Missing comma", "7"]
        );
    }

    #[test]
    fn test_bare_string_becomes_single_item_list() {
        let raw = r#"{"resumeScore": 50, "formattingTips": "Use bullet points"}"#;
        assert_eq!(
            normalize(raw).unwrap().formatting_tips,
            vec!["Use bullet points"]
        );
    }

    #[test]
    fn test_lenient_score_and_nulls() {
        let result = normalize(r#"{"resumeScore": "82.6", "keywordsMissing": null}"#).unwrap();
        assert_eq!(result.resume_score, 83);
        assert!(result.keywords_missing.is_empty());
        assert!(result.ats_compatibility.is_none());
    }

    #[test]
    fn test_ranges_are_not_clamped_here() {
        assert_eq!(normalize(r#"{"resumeScore": 150}"#).unwrap().resume_score, 150);
    }

    #[test]
    fn test_provider_metadata_is_discarded() {
        let raw = r#"{"resumeScore": 60, "id": "nope", "metadata": {"provider": "spoofed"}}"#;
        let result = normalize(raw).unwrap();
        assert!(result.id.is_none());
        assert_eq!(result.metadata.provider, "");
    }

    #[test]
    fn test_duplicate_keywords_removed_in_order() {
        let raw = r#"{"resumeScore": 60, "keywordsMatched": ["Rust", "Go", "rust"]}"#;
        assert_eq!(normalize(raw).unwrap().keywords_matched, vec!["Rust", "Go"]);
    }
}
