//! Post-processing: recover the exercise list from free-form model output.
//!
//! Models asked for "only a JSON array" still wrap it in narration
//! ("Sure! Here you go: [...] Hope that helps."), code fences or both. The
//! parser therefore looks for the bracketed array anywhere in the response
//! and parses just that substring.
//!
//! ## Rules (applied in order)
//!
//! 1. Trim the response
//! 2. Take the span from the first `[` to the last `]`, across newlines
//! 3. Parse it as a JSON array of strings
//! 4. Clean each name: strip invisible Unicode, collapse inner whitespace, trim
//! 5. Drop names that are blank after cleaning
//!
//! Duplicates are kept: removing them is the model's job per the prompt.

use crate::error::DemosError;
use crate::output::ExerciseName;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Parse the model's response into exercise names.
///
/// # Errors
/// [`DemosError::ExtractionParse`] when no bracketed span exists or the span
/// is not a JSON array of strings.
pub fn parse_exercise_list(response: &str) -> Result<Vec<ExerciseName>, DemosError> {
    let trimmed = response.trim();

    let span = RE_JSON_ARRAY
        .find(trimmed)
        .ok_or_else(|| DemosError::ExtractionParse {
            detail: "no JSON array found in model response".to_string(),
        })?;

    let raw: Vec<String> =
        serde_json::from_str(span.as_str()).map_err(|e| DemosError::ExtractionParse {
            detail: format!("invalid JSON array: {e}"),
        })?;

    Ok(raw
        .iter()
        .filter_map(|name| ExerciseName::new(clean_name(name)))
        .collect())
}

/// Normalise one name returned by the model.
pub fn clean_name(name: &str) -> String {
    let visible: String = name.chars().filter(|c| !is_invisible(*c)).collect();
    RE_WHITESPACE.replace_all(visible.trim(), " ").into_owned()
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}
