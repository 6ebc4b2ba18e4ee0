use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Canonical analysis shape produced by every provider and by the heuristic fallback.
///
/// Serialized in camelCase: this is the JSON stored in `analyses.result` and
/// returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Id of the persisted analysis row. `None` until the result is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub resume_score: i64,
    #[serde(default)]
    pub grammar_issues: Vec<String>,
    #[serde(default)]
    pub formatting_tips: Vec<String>,
    #[serde(default)]
    pub keywords_matched: Vec<String>,
    #[serde(default)]
    pub keywords_missing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ats_compatibility: Option<AtsCompatibility>,
    #[serde(default)]
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Forces `resume_score` into [0, 100].
    pub fn clamp_score(&mut self) {
        self.resume_score = self.resume_score.clamp(0, 100);
    }
}

/// Provenance block recording which analysis path produced a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub message: String,
}

impl AnalysisMetadata {
    pub fn new(provider: impl Into<String>, is_fallback: bool) -> Self {
        let provider = provider.into();
        let message = if is_fallback {
            format!("Analysis completed using {provider} due to API limitations")
        } else {
            format!("Analysis completed using {provider}")
        };
        Self {
            provider,
            is_fallback,
            message,
        }
    }
}

/// ATS verdict. Providers do not always answer with one of the three ratings,
/// so numeric scores, free-form labels and structured verdicts are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AtsCompatibility {
    Rating(AtsRating),
    Score(f64),
    Label(String),
    /// Any other JSON shape, e.g. `{"score": 85, "rating": "Good"}`.
    Other(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtsRating {
    #[serde(alias = "good", alias = "GOOD")]
    Good,
    #[serde(alias = "average", alias = "AVERAGE")]
    Average,
    #[serde(alias = "poor", alias = "POOR")]
    Poor,
}

impl AtsRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtsRating::Good => "Good",
            AtsRating::Average => "Average",
            AtsRating::Poor => "Poor",
        }
    }
}

impl From<AtsRating> for AtsCompatibility {
    fn from(rating: AtsRating) -> Self {
        AtsCompatibility::Rating(rating)
    }
}

impl AtsCompatibility {
    /// Display label: the rating name, the numeric score, the provider's label,
    /// or the `rating` of a structured verdict.
    pub fn label(&self) -> String {
        match self {
            AtsCompatibility::Rating(r) => r.as_str().to_string(),
            AtsCompatibility::Score(s) => format!("{s}"),
            AtsCompatibility::Label(l) => l.clone(),
            AtsCompatibility::Other(v) => v
                .get("rating")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| v.to_string()),
        }
    }
}
