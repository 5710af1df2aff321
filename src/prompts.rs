//! Prompts for the exercise-name extraction call.
//!
//! Keeping every prompt here means changing the extraction behaviour touches
//! exactly one place, and unit tests can inspect prompts without a model.
//!
//! Callers can override the system prompt via
//! [`crate::config::DemoConfig::system_prompt`]; the user prompt always
//! embeds the document text through [`extraction_prompt`].

/// Default system message for the extraction call.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a fitness expert assistant that extracts exercise names from text.";

/// Build the user message that carries the extracted PDF text.
///
/// The model is asked for a bare JSON array; the parser still tolerates
/// surrounding prose because models add it anyway.
pub fn extraction_prompt(pdf_text: &str) -> String {
    format!(
        r#"You are an AI assistant specialized in fitness. The following text was extracted from a workout plan PDF.
Please identify all exercise names mentioned in this text and return them as a JSON array of strings.
Only include proper exercise names, not section titles or other text. Remove any duplicate exercises.
If there are variations of the same exercise (e.g., "Barbell Squat" and "Barbell Back Squat"), keep both.

PDF Text:
{pdf_text}

Return only a JSON array of exercise names, nothing else. Format: ["Exercise 1", "Exercise 2", ...]"#
    )
}

/// Query sent to the video search for one exercise.
pub fn video_query(exercise: &str) -> String {
    format!("{exercise} exercise tutorial proper form")
}

/// Query sent to the image search for one exercise's card thumbnail.
pub fn logo_query(exercise: &str) -> String {
    format!("{exercise} exercise logo icon fitness")
}
