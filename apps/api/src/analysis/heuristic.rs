//! Heuristic scorer: deterministic offline resume assessment.
//!
//! Used whenever no AI provider produces a usable analysis. Pure function of
//! the input text: the same text always yields the same result.
//!
//! Algorithm:
//! 1. Count words (non-empty whitespace-separated tokens; empty text has 0).
//! 2. Detect an email address and a phone number.
//! 3. Find vocabulary skills as case-insensitive substrings, in vocabulary order.
//! 4. Score = 30 + additive bonuses, capped at 100.
//! 5. ATS verdict, formatting tips, and keyword lists derive from the same signals.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::analysis::{AnalysisMetadata, AnalysisResult, AtsRating};

pub const TECHNICAL_SKILLS: &[&str] = &[
    "javascript",
    "python",
    "java",
    "react",
    "node.js",
    "sql",
    "aws",
    "docker",
    "kubernetes",
    "git",
    "typescript",
    "postgresql",
    "linux",
    "agile",
];

pub const SOFT_SKILLS: &[&str] = &[
    "leadership",
    "communication",
    "teamwork",
    "problem solving",
    "project management",
    "collaboration",
    "mentoring",
    "adaptability",
];

pub const BUSINESS_SKILLS: &[&str] = &[
    "data analysis",
    "strategy",
    "budgeting",
    "forecasting",
    "risk management",
    "quality assurance",
    "compliance",
    "reporting",
];

/// Provider label the scorer stamps on its own output. The cascade replaces it.
pub const HEURISTIC_PROVIDER: &str = "Heuristic";

/// Sole grammar entry of every fallback result. Contains the
/// "API unavailability" marker the cascade uses to recognise degraded results.
pub const FALLBACK_GRAMMAR_NOTICE: &str = "Analysis limited due to API unavailability. \
    Grammar review was skipped for this fallback analysis; try again later for a detailed grammar review.";

const BASE_SCORE: i64 = 30;
const MAX_KEYWORDS_MATCHED: usize = 10;
const MAX_KEYWORDS_MISSING: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{3}[-.]?[0-9]{3}[-.]?[0-9]{4}\b").expect("valid phone regex"));
static EXPERIENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)experience|work|employment|job").expect("valid regex"));
static EDUCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)education|degree|university|college|school").expect("valid regex")
});
static SKILLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)skills|technologies|tools").expect("valid regex"));

/// Every vocabulary term, technical first, then soft, then business.
pub fn vocabulary() -> impl Iterator<Item = &'static str> {
    TECHNICAL_SKILLS
        .iter()
        .chain(SOFT_SKILLS)
        .chain(BUSINESS_SKILLS)
        .copied()
}

/// Whitespace-only or empty text has zero words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Raw observations the score, verdict and tips are computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSignals {
    pub word_count: usize,
    pub has_email: bool,
    pub has_phone: bool,
    pub found_skills: Vec<&'static str>,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills_section: bool,
}

impl TextSignals {
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            word_count: count_words(text),
            has_email: EMAIL_RE.is_match(text),
            has_phone: PHONE_RE.is_match(text),
            found_skills: vocabulary().filter(|s| lower.contains(s)).collect(),
            has_experience: EXPERIENCE_RE.is_match(text),
            has_education: EDUCATION_RE.is_match(text),
            has_skills_section: SKILLS_RE.is_match(text),
        }
    }

    pub fn score(&self) -> i64 {
        let skills = self.found_skills.len();
        let bonuses = [
            (self.has_email, 10),
            (self.has_phone, 10),
            (self.word_count > 200, 15),
            (self.word_count > 500, 10),
            (skills > 5, 20),
            (skills > 10, 15),
            (self.has_experience, 10),
            (self.has_education, 5),
            (self.has_skills_section, 5),
        ];
        let total = bonuses
            .iter()
            .filter(|(applies, _)| *applies)
            .fold(BASE_SCORE, |acc, (_, bonus)| acc + bonus);
        total.min(100)
    }

    pub fn ats_rating(&self) -> AtsRating {
        let skills = self.found_skills.len();
        if skills > 8 && self.has_experience && self.has_education {
            AtsRating::Good
        } else if skills < 3 || self.word_count < 100 {
            AtsRating::Poor
        } else {
            AtsRating::Average
        }
    }

    pub fn formatting_tips(&self) -> Vec<String> {
        let mut tips = Vec::new();
        if self.word_count < 200 {
            tips.push(
                "Consider adding more detailed descriptions of your experience and achievements."
                    .to_string(),
            );
        }
        if self.found_skills.len() < 5 {
            tips.push(
                "Include more specific technical and soft skills relevant to your target industry."
                    .to_string(),
            );
        }
        if !self.has_experience {
            tips.push("Add a work experience section with quantifiable achievements.".to_string());
        }
        if !self.has_education {
            tips.push(
                "Include your educational background and relevant certifications.".to_string(),
            );
        }
        if tips.is_empty() {
            tips.push(
                "Your resume has good structure. Consider adding quantifiable achievements to stand out."
                    .to_string(),
            );
        }
        tips
    }
}

/// Scores `text` without any AI provider.
pub fn heuristic_analysis(text: &str) -> AnalysisResult {
    let signals = TextSignals::from_text(text);

    let keywords_matched = signals
        .found_skills
        .iter()
        .take(MAX_KEYWORDS_MATCHED)
        .map(|s| s.to_string())
        .collect();
    let keywords_missing = vocabulary()
        .filter(|s| !signals.found_skills.contains(s))
        .take(MAX_KEYWORDS_MISSING)
        .map(String::from)
        .collect();

    AnalysisResult {
        id: None,
        resume_score: signals.score(),
        grammar_issues: vec![FALLBACK_GRAMMAR_NOTICE.to_string()],
        formatting_tips: signals.formatting_tips(),
        keywords_matched,
        keywords_missing,
        ats_compatibility: Some(signals.ats_rating().into()),
        metadata: AnalysisMetadata::new(HEURISTIC_PROVIDER, true),
    }
}
