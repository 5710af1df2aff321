//! # workout-demos
//!
//! Find a demonstration video for every exercise in a workout-plan PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL (≤ 5 MiB, %PDF)
//!  ├─ 2. Text     extract page text via pdfium (spawn_blocking)
//!  ├─ 3. LLM      one chat completion → JSON array of exercise names
//!  ├─ 4. Resolve  per exercise: video search, channel allow-list, logo search
//!  │              (first 12 names, bounded concurrency, input order kept)
//!  └─ 5. Output   ResultSet of exercises with videos + run stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use workout_demos::{find_demos, DemoConfig, ModalView};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LLM provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     // Search key read from SERPER_API_KEY.
//!     let config = DemoConfig::default();
//!     let output = find_demos("workout-plan.pdf", &config).await?;
//!     for entry in &output.results {
//!         println!("{} → {}", entry.exercise, entry.video.link);
//!     }
//!     if let Some(first) = output.results.iter().next() {
//!         let modal = ModalView::for_video(&output.results, &first.video.video_id);
//!         println!("{modal:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `workout-demos` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod demos;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod present;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    DemoConfig, DemoConfigBuilder, DEFAULT_CONCURRENCY, DEFAULT_MAX_EXERCISES,
    DEFAULT_MAX_FILE_BYTES,
};
pub use demos::{
    extract_exercise_names, find_demos, find_demos_from_bytes, find_demos_sync,
    find_demos_to_file, resolve_exercises, DemoPipeline,
};
pub use error::{DemosError, SearchError};
pub use output::{
    DemoOutput, ExerciseName, NoMatchReason, Resolution, ResolvedExercise, ResultSet, RunStats,
    VideoCandidate,
};
pub use pipeline::llm::{ExerciseExtractor, Extraction, LlmExerciseExtractor};
pub use pipeline::resolve::VideoResolver;
pub use pipeline::search::{ImageRecord, SearchParams, SerperClient, VideoRecord, VideoSearch};
pub use pipeline::text::{PdfiumTextExtractor, TextExtractor};
pub use present::{render_markdown, Card, ModalView};
pub use progress::{NoopProgressCallback, ProgressCallback, ResolutionProgressCallback};
pub use stream::{resolve_stream, ResolutionStream, ResolvedItem};
