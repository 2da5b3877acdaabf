//! Career recommendation — turns a trait profile and its matched candidates
//! into a short, validated recommendation list.
//!
//! The LLM only ever narrows the candidate list; anything it returns that is
//! not a candidate is discarded. If nothing survives validation the first
//! three candidates stand in, so the student always gets recommendations
//! when the catalog matched anything at all.

pub mod prompts;

use serde::Serialize;
use tracing::{info, warn};

use crate::assessment::profile::TraitProfile;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::recommendation::prompts::{RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDATION_SYSTEM};

/// How many fallback candidates to surface when LLM output is unusable.
const FALLBACK_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Llm,
    Fallback,
}

#[derive(Debug, Serialize)]
pub struct Recommendations {
    pub recommended: Vec<String>,
    pub source: RecommendationSource,
}

/// Builds the human-readable assessment summary used in the recommendation
/// prompt and the chat greeting.
pub fn build_assessment_summary(profile: &TraitProfile, candidates: &[String]) -> String {
    let mut summary = format!("Top-3 RIASEC code: {}\n", profile.top3);
    for ranked in &profile.ordered {
        summary.push_str(&format!(
            "- {}: {:.0}/100\n",
            ranked.dimension.letter(),
            ranked.score
        ));
    }
    if !candidates.is_empty() {
        summary.push_str("Matched careers: ");
        summary.push_str(&candidates.join(", "));
        summary.push('\n');
    }
    summary
}

/// Asks the LLM to pick from the candidate list, then validates its output.
pub async fn recommend(
    llm: &LlmClient,
    profile: &TraitProfile,
    candidates: &[String],
) -> Result<Recommendations, AppError> {
    if candidates.is_empty() {
        return Ok(Recommendations {
            recommended: Vec::new(),
            source: RecommendationSource::Fallback,
        });
    }

    let summary = build_assessment_summary(profile, &[]);
    let candidate_list = candidates
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{summary}", &summary)
        .replace("{candidates}", &candidate_list);

    let raw: Vec<String> = llm.call_json(&prompt, RECOMMENDATION_SYSTEM).await?;
    let (recommended, source) = validate_recommendations(raw, candidates);

    info!(
        count = recommended.len(),
        source = ?source,
        "recommendations ready"
    );
    Ok(Recommendations {
        recommended,
        source,
    })
}

/// Keeps only recommendations that name an actual candidate; falls back to
/// the first candidates in catalog order when nothing survives.
fn validate_recommendations(
    raw: Vec<String>,
    candidates: &[String],
) -> (Vec<String>, RecommendationSource) {
    let mut validated = Vec::new();
    for name in raw {
        let trimmed = name.trim();
        match candidates.iter().find(|c| c.as_str() == trimmed) {
            Some(candidate) => {
                if !validated.contains(candidate) {
                    validated.push(candidate.clone());
                }
            }
            None => warn!(career = trimmed, "discarding recommendation not in candidate list"),
        }
    }

    if validated.is_empty() {
        let fallback: Vec<String> = candidates.iter().take(FALLBACK_COUNT).cloned().collect();
        (fallback, RecommendationSource::Fallback)
    } else {
        (validated, RecommendationSource::Llm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::profile::compute_profile;
    use std::collections::HashMap;

    fn candidates() -> Vec<String> {
        vec![
            "Pilot".to_string(),
            "Surveyor".to_string(),
            "Lab Technician".to_string(),
            "Forester".to_string(),
        ]
    }

    #[test]
    fn test_valid_recommendations_pass_through() {
        let (validated, source) = validate_recommendations(
            vec!["Surveyor".to_string(), "Pilot".to_string()],
            &candidates(),
        );
        assert_eq!(validated, vec!["Surveyor", "Pilot"]);
        assert_eq!(source, RecommendationSource::Llm);
    }

    #[test]
    fn test_hallucinated_careers_are_discarded() {
        let (validated, source) = validate_recommendations(
            vec!["Astronaut".to_string(), "Pilot".to_string()],
            &candidates(),
        );
        assert_eq!(validated, vec!["Pilot"]);
        assert_eq!(source, RecommendationSource::Llm);
    }

    #[test]
    fn test_all_invalid_falls_back_to_catalog_order() {
        let (validated, source) = validate_recommendations(
            vec!["Astronaut".to_string(), "Wizard".to_string()],
            &candidates(),
        );
        assert_eq!(validated, vec!["Pilot", "Surveyor", "Lab Technician"]);
        assert_eq!(source, RecommendationSource::Fallback);
    }

    #[test]
    fn test_empty_llm_output_falls_back() {
        let (validated, source) = validate_recommendations(Vec::new(), &candidates());
        assert_eq!(validated.len(), 3);
        assert_eq!(source, RecommendationSource::Fallback);
    }

    #[test]
    fn test_duplicates_and_whitespace_handled() {
        let (validated, _) = validate_recommendations(
            vec![
                " Pilot ".to_string(),
                "Pilot".to_string(),
                "Forester".to_string(),
            ],
            &candidates(),
        );
        assert_eq!(validated, vec!["Pilot", "Forester"]);
    }

    #[test]
    fn test_summary_mentions_top3_and_candidates() {
        let profile = compute_profile(&HashMap::new());
        let summary = build_assessment_summary(&profile, &candidates()[..1].to_vec());
        assert!(summary.contains("Top-3 RIASEC code"));
        assert!(summary.contains("Pilot"));
    }
}
