use steadfast_core::{LocatorKind, Strategy};

use super::model::{StrategySuggestion, Suggestion, SuggestionSource};

/// Static fallback table used before anything has been learned for a site.
/// Confidences stay at or below 0.4.
const COLD_START: &[(&str, &str, f64)] = &[
    ("email", r#"input[type="email"]"#, 0.4),
    ("password", r#"input[type="password"]"#, 0.4),
    ("username", r#"input[name="username"]"#, 0.3),
    ("user", r#"input[autocomplete="username"]"#, 0.25),
    ("search", r#"input[type="search"]"#, 0.35),
    ("query", r#"input[name="q"]"#, 0.3),
    ("submit", r#"button[type="submit"]"#, 0.35),
    ("login", r#"button[type="submit"]"#, 0.3),
    ("sign", r#"button[type="submit"]"#, 0.3),
];

const GENERIC: (&str, f64) = (r#"button[type="submit"]"#, 0.1);

const COLD_STRATEGY_CONFIDENCE: f64 = 0.3;

pub(crate) fn cold_candidate(hint: Option<&str>, task_type: &str, exclude: &[String]) -> Suggestion {
    let texts = [hint.unwrap_or(""), task_type].map(str::to_ascii_lowercase);
    let hit = texts.iter().find_map(|text| {
        COLD_START.iter().find(|(kw, locator, _)| {
            !text.is_empty() && text.contains(kw) && !exclude.iter().any(|e| e == locator)
        })
    });
    let (locator, confidence) = match hit {
        Some((_, locator, confidence)) => (*locator, *confidence),
        None => GENERIC,
    };
    Suggestion {
        locator: locator.to_string(),
        kind: LocatorKind::infer(locator),
        confidence,
        source: SuggestionSource::ColdStart,
    }
}

pub(crate) fn cold_strategy() -> StrategySuggestion {
    StrategySuggestion {
        strategy: Strategy::Direct,
        confidence: COLD_STRATEGY_CONFIDENCE,
        source: SuggestionSource::ColdStart,
    }
}
