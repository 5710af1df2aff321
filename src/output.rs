//! Result types produced by a workout-demo run.
//!
//! [`ResultSet`] is the only value that outlives a run: the presentation
//! layer renders it and later looks entries up by video id when the user
//! opens a demo. It is returned to the caller, never stored globally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel label used when the search API omits the channel name.
pub const UNKNOWN_CHANNEL: &str = "YouTube Channel";

/// A non-empty exercise name, the key for one exercise across the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseName(String);

impl ExerciseName {
    /// Wrap a name, trimming surrounding whitespace. Blank input yields `None`.
    pub fn new(name: impl AsRef<str>) -> Option<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExerciseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The selected demonstration video for one exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub title: String,
    /// The video's own thumbnail; empty when the API gave none.
    pub thumbnail: String,
    pub channel_name: String,
    /// Canonical watch link as returned by the search API.
    pub link: String,
    /// Platform video identifier extracted from `link`.
    pub video_id: String,
    /// Duration text such as `"4:12"`; empty when unknown.
    pub duration: String,
}

/// One exercise paired with its demo video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExercise {
    pub exercise: ExerciseName,
    pub video: VideoCandidate,
    /// Thumbnail from the image search, preferred over the video thumbnail.
    pub thumbnail_override: Option<String>,
}

impl ResolvedExercise {
    /// The thumbnail a card should show.
    pub fn display_thumbnail(&self) -> &str {
        self.thumbnail_override
            .as_deref()
            .unwrap_or(&self.video.thumbnail)
    }
}

/// Why an exercise ended up without a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoMatchReason {
    /// The video search returned zero results.
    NoResults,
    /// The chosen result's link is not a recognisable watch URL.
    UnrecognisedLink { link: String },
    /// The video search request failed.
    SearchFailed(String),
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::NoResults => f.write_str("no video results"),
            NoMatchReason::UnrecognisedLink { link } => {
                write!(f, "unrecognised video link '{link}'")
            }
            NoMatchReason::SearchFailed(detail) => write!(f, "video search failed: {detail}"),
        }
    }
}

/// The outcome of resolving one exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched(ResolvedExercise),
    NoMatch(NoMatchReason),
}

impl Resolution {
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    /// The resolved exercise, discarding the no-match reason.
    pub fn into_matched(self) -> Option<ResolvedExercise> {
        match self {
            Resolution::Matched(r) => Some(r),
            Resolution::NoMatch(_) => None,
        }
    }
}

/// Exercises that resolved to a video, in the order their names were extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: Vec<ResolvedExercise>,
}

impl ResultSet {
    pub fn new(entries: Vec<ResolvedExercise>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedExercise> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedExercise] {
        &self.entries
    }

    /// Find the entry playing `video_id`. Linear scan; `None` when absent.
    pub fn find_by_video_id(&self, video_id: &str) -> Option<&ResolvedExercise> {
        self.entries.iter().find(|r| r.video.video_id == video_id)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ResolvedExercise;
    type IntoIter = std::slice::Iter<'a, ResolvedExercise>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResolvedExercise;
    type IntoIter = std::vec::IntoIter<ResolvedExercise>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Names returned by the extractor.
    pub extracted: usize,
    /// Names actually looked up (after the cap).
    pub attempted: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Characters of text pulled out of the PDF.
    pub text_chars: usize,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub extraction_duration_ms: u64,
    pub resolution_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoOutput {
    /// All names the extractor returned, in model order (before the cap).
    pub exercises: Vec<ExerciseName>,
    pub results: ResultSet,
    pub stats: RunStats,
}
