// LLM prompt constants for the recommendation module.

/// System prompt for career recommendation — enforces JSON-only output.
pub const RECOMMENDATION_SYSTEM: &str =
    "You are a career guidance counselor for Indian students aged 13-15. \
    You recommend careers strictly from a provided candidate list. \
    You MUST respond with a valid JSON array of strings only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT invent careers that are not in the candidate list.";

/// Recommendation prompt template. Replace `{summary}` and `{candidates}`
/// before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"A student completed a RIASEC interest assessment. Their results:

{summary}

Candidate careers matched to their profile (choose ONLY from this list):
{candidates}

Pick the 3 careers from the candidate list that best fit the student's strongest dimensions, most suitable first. Return a JSON array of the exact career names as they appear in the list, e.g. ["Career A", "Career B", "Career C"].
"#;
