//! Likert label tables for the six supported languages.
//!
//! Labels live in a construction-time table keyed by [`Language`] so a
//! missing language is a compile error, never a silent miss at runtime.
//! Answer text arrives from the UI in whatever language the student picked,
//! so matching always scans every language's label set.

use serde::{Deserialize, Serialize};

/// Languages the assessment UI ships labels for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Te,
    Ta,
    Bn,
    Mr,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::En,
        Language::Hi,
        Language::Te,
        Language::Ta,
        Language::Bn,
        Language::Mr,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Te => "te",
            Language::Ta => "ta",
            Language::Bn => "bn",
            Language::Mr => "mr",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

/// The five Likert levels, indexed `level - 1`, from "strongly disagree" (1)
/// to "strongly agree" (5).
pub fn labels_for(language: Language) -> &'static [&'static str; 5] {
    match language {
        Language::En => &[
            "strongly disagree",
            "disagree",
            "neutral",
            "agree",
            "strongly agree",
        ],
        Language::Hi => &[
            "पूरी तरह असहमत",
            "असहमत",
            "तटस्थ",
            "सहमत",
            "पूरी तरह सहमत",
        ],
        Language::Te => &[
            "పూర్తిగా అంగీకరించను",
            "అంగీకరించను",
            "తటస్థం",
            "అంగీకరిస్తాను",
            "పూర్తిగా అంగీకరిస్తాను",
        ],
        Language::Ta => &[
            "முற்றிலும் உடன்படவில்லை",
            "உடன்படவில்லை",
            "நடுநிலை",
            "உடன்படுகிறேன்",
            "முற்றிலும் உடன்படுகிறேன்",
        ],
        Language::Bn => &[
            "সম্পূর্ণ অসম্মত",
            "অসম্মত",
            "নিরপেক্ষ",
            "সম্মত",
            "সম্পূর্ণ সম্মত",
        ],
        Language::Mr => &[
            "पूर्णपणे असहमत",
            "असहमत",
            "तटस्थ",
            "सहमत",
            "पूर्णपणे सहमत",
        ],
    }
}

/// Neutral level used when an answer label matches nothing at all.
pub const NEUTRAL_LEVEL: u8 = 3;

/// Exact match of a normalized answer label against every language's table.
pub fn match_level(raw: &str) -> Option<u8> {
    let normalized = normalize(raw);
    for language in Language::ALL {
        for (idx, label) in labels_for(language).iter().enumerate() {
            if normalize(label) == normalized {
                return Some(idx as u8 + 1);
            }
        }
    }
    None
}

/// Resolves an answer label to a Likert level 1–5.
///
/// Exact lookup first; then substring containment in either direction,
/// preferring the longest known label so "strongly agree" wins over the
/// embedded "agree". Anything still unmatched is the neutral level.
pub fn resolve_level(raw: &str) -> u8 {
    if let Some(level) = match_level(raw) {
        return level;
    }

    let normalized = normalize(raw);
    if normalized.is_empty() {
        return NEUTRAL_LEVEL;
    }

    let mut best: Option<(usize, u8)> = None;
    for language in Language::ALL {
        for (idx, label) in labels_for(language).iter().enumerate() {
            let known = normalize(label);
            if normalized.contains(&known) || known.contains(&normalized) {
                let len = known.chars().count();
                if best.map_or(true, |(best_len, _)| len > best_len) {
                    best = Some((len, idx as u8 + 1));
                }
            }
        }
    }

    best.map(|(_, level)| level).unwrap_or(NEUTRAL_LEVEL)
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
