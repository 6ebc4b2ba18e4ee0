//! Provider cascade: an ordered chain of AI providers with a heuristic floor.
//!
//! Providers are tried strictly in sequence. A provider error or an
//! unparseable reply moves on to the next provider; nothing is surfaced to the
//! caller. When the list is exhausted the heuristic scorer answers, so
//! `analyze` always returns a usable result.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::heuristic::{heuristic_analysis, HEURISTIC_PROVIDER};
use crate::analysis::normalizer::normalize;
use crate::analysis::prompts::build_analysis_prompt;
use crate::models::analysis::{AnalysisMetadata, AnalysisResult};
use crate::providers::Provider;

/// Phrases a provider puts in `grammarIssues` when it is itself running in a
/// degraded mode. Matched case-insensitively.
const DEGRADED_SERVICE_MARKERS: &[&str] = &["analysis limited due to api quota", "api unavailability"];

#[derive(Clone)]
pub struct ProviderCascade {
    providers: Vec<Arc<dyn Provider>>,
}

impl ProviderCascade {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let prompt = build_analysis_prompt(text);
        let mut last_attempted: Option<&str> = None;

        for provider in &self.providers {
            let name = provider.name();
            last_attempted = Some(name);

            let raw = match provider.complete(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Provider {name} failed: {e}");
                    continue;
                }
            };

            let mut result = match normalize(&raw) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Provider {name} returned an unusable response: {e}");
                    continue;
                }
            };

            let degraded = reports_degraded_service(&result);
            if degraded {
                warn!("Provider {name} reported degraded service, marking result as fallback");
            }
            result.clamp_score();
            result.metadata = AnalysisMetadata::new(name, degraded);
            info!("Analysis produced by {name}: score {}", result.resume_score);
            return result;
        }

        let label = format!("{} (Fallback)", last_attempted.unwrap_or(HEURISTIC_PROVIDER));
        warn!("All providers exhausted, using heuristic analysis as {label}");
        let mut result = heuristic_analysis(text);
        result.metadata = AnalysisMetadata::new(label, true);
        result
    }
}

fn reports_degraded_service(result: &AnalysisResult) -> bool {
    result.grammar_issues.iter().any(|issue| {
        let issue = issue.to_lowercase();
        DEGRADED_SERVICE_MARKERS.iter().any(|m| issue.contains(m))
    })
}
