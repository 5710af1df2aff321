//! Eager (whole-run) entry points.
//!
//! A run reads the PDF, extracts its text, asks the model for exercise names,
//! then resolves up to `max_exercises` of them concurrently and returns the
//! [`ResultSet`] in input order. Use [`crate::stream::resolve_stream`] to
//! receive resolutions as they complete instead.

use crate::config::DemoConfig;
use crate::error::DemosError;
use crate::output::{DemoOutput, ExerciseName, Resolution, ResultSet, RunStats};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::llm::{ExerciseExtractor, LlmExerciseExtractor};
use crate::pipeline::resolve::VideoResolver;
use crate::pipeline::search::SerperClient;
use crate::pipeline::text::{PdfiumTextExtractor, TextExtractor};
use crate::present::render_markdown;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The assembled pipeline: text extractor, name extractor and resolver.
///
/// Holds no per-run state, so one pipeline can serve many runs.
pub struct DemoPipeline {
    text: Arc<dyn TextExtractor>,
    extractor: Arc<dyn ExerciseExtractor>,
    resolver: VideoResolver,
    config: DemoConfig,
}

impl DemoPipeline {
    /// Assemble a pipeline from explicit components.
    pub fn new(
        text: Arc<dyn TextExtractor>,
        extractor: Arc<dyn ExerciseExtractor>,
        resolver: VideoResolver,
        config: DemoConfig,
    ) -> Self {
        Self {
            text,
            extractor,
            resolver,
            config,
        }
    }

    /// Assemble the production pipeline: pdfium, the configured LLM
    /// provider and the Serper API.
    pub fn from_config(config: &DemoConfig) -> Result<Self, DemosError> {
        let search = SerperClient::from_config(config)?;
        let extractor = LlmExerciseExtractor::from_config(config)?;
        Ok(Self::new(
            Arc::new(PdfiumTextExtractor),
            Arc::new(extractor),
            VideoResolver::new(Arc::new(search), config),
            config.clone(),
        ))
    }

    /// Run on a local path or HTTP/HTTPS URL.
    pub async fn run(&self, input_str: &str) -> Result<DemoOutput, DemosError> {
        info!("Starting run: {}", input_str);
        let resolved = input::resolve_input(
            input_str,
            self.config.max_file_bytes,
            self.config.download_timeout_secs,
        )
        .await?;
        self.run_resolved(resolved).await
    }

    /// Run on PDF bytes already in memory.
    pub async fn run_bytes(
        &self,
        source_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DemoOutput, DemosError> {
        input::validate_pdf_bytes(source_name, &bytes, self.config.max_file_bytes)?;
        self.run_resolved(ResolvedInput {
            source_name: source_name.to_string(),
            bytes,
        })
        .await
    }

    /// Run on document text, skipping PDF handling.
    pub async fn run_text(&self, text: &str) -> Result<DemoOutput, DemosError> {
        let total_start = Instant::now();

        // ── Step 1: Extract exercise names ───────────────────────────────
        let extraction_start = Instant::now();
        let extraction = self.extractor.extract(text).await?;
        let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;

        if extraction.names.is_empty() {
            return Err(DemosError::EmptyExtraction);
        }
        info!("Extracted {} exercises", extraction.names.len());

        // ── Step 2: Resolve videos ───────────────────────────────────────
        let resolution_start = Instant::now();
        let results = resolve_exercises(&extraction.names, &self.resolver, &self.config).await;
        let resolution_duration_ms = resolution_start.elapsed().as_millis() as u64;

        let attempted = extraction.names.len().min(self.config.max_exercises);
        let stats = RunStats {
            extracted: extraction.names.len(),
            attempted,
            matched: results.len(),
            unmatched: attempted - results.len(),
            text_chars: text.chars().count(),
            prompt_tokens: extraction.prompt_tokens,
            completion_tokens: extraction.completion_tokens,
            extraction_duration_ms,
            resolution_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Run complete: {}/{} exercises matched, {}ms total",
            stats.matched, stats.attempted, stats.total_duration_ms
        );

        Ok(DemoOutput {
            exercises: extraction.names,
            results,
            stats,
        })
    }

    /// Extract exercise names only, without any search.
    pub async fn extract_names(&self, input_str: &str) -> Result<Vec<ExerciseName>, DemosError> {
        extract_names_with(
            self.text.as_ref(),
            self.extractor.as_ref(),
            input_str,
            &self.config,
        )
        .await
    }

    async fn run_resolved(&self, resolved: ResolvedInput) -> Result<DemoOutput, DemosError> {
        let total_start = Instant::now();
        let text = self
            .text
            .extract_text(resolved, self.config.password.as_deref())
            .await?;
        debug!("Extracted {} chars of text", text.len());

        let mut output = self.run_text(&text).await?;
        output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        Ok(output)
    }
}

/// Resolve the first `config.max_exercises` names, at most
/// `config.concurrency` at a time.
///
/// Names that produce no video are left out. The returned set follows the
/// order of `names`, whatever order the searches finish in.
pub async fn resolve_exercises(
    names: &[ExerciseName],
    resolver: &VideoResolver,
    config: &DemoConfig,
) -> ResultSet {
    let selected = &names[..names.len().min(config.max_exercises)];
    let total = selected.len();
    if total < names.len() {
        debug!("Capping {} exercises to {}", names.len(), total);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(total);
    }

    let mut outcomes: Vec<(usize, Resolution)> =
        stream::iter(selected.iter().enumerate().map(|(idx, name)| {
            let cb = config.progress_callback.clone();
            async move {
                if let Some(ref cb) = cb {
                    cb.on_exercise_start(idx, total, name.as_str());
                }
                let resolution = resolver.resolve(name).await;
                if let Some(ref cb) = cb {
                    match &resolution {
                        Resolution::Matched(r) => {
                            cb.on_exercise_matched(idx, total, name.as_str(), &r.video.channel_name)
                        }
                        Resolution::NoMatch(reason) => {
                            cb.on_exercise_unmatched(idx, total, name.as_str(), &reason.to_string())
                        }
                    }
                }
                (idx, resolution)
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    // Completion order → input order
    outcomes.sort_by_key(|(idx, _)| *idx);

    let results = ResultSet::new(
        outcomes
            .into_iter()
            .filter_map(|(_, resolution)| resolution.into_matched())
            .collect(),
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(total, results.len());
    }

    results
}

/// Extract the exercise names from a PDF file or URL, without searching.
///
/// Only the LLM provider is needed; the search key is never looked up.
pub async fn extract_exercise_names(
    input_str: impl AsRef<str>,
    config: &DemoConfig,
) -> Result<Vec<ExerciseName>, DemosError> {
    let extractor = LlmExerciseExtractor::from_config(config)?;
    extract_names_with(&PdfiumTextExtractor, &extractor, input_str.as_ref(), config).await
}

async fn extract_names_with(
    text: &dyn TextExtractor,
    extractor: &dyn ExerciseExtractor,
    input_str: &str,
    config: &DemoConfig,
) -> Result<Vec<ExerciseName>, DemosError> {
    let resolved =
        input::resolve_input(input_str, config.max_file_bytes, config.download_timeout_secs)
            .await?;
    let text = text
        .extract_text(resolved, config.password.as_deref())
        .await?;
    let extraction = extractor.extract(&text).await?;
    if extraction.names.is_empty() {
        return Err(DemosError::EmptyExtraction);
    }
    Ok(extraction.names)
}

/// Find demo videos for a PDF file or URL using the production pipeline.
///
/// # Errors
/// Returns `Err(DemosError)` for fatal errors only: bad input, extraction
/// failure, zero exercises. Exercises without a video simply do not appear in
/// `output.results`.
pub async fn find_demos(
    input_str: impl AsRef<str>,
    config: &DemoConfig,
) -> Result<DemoOutput, DemosError> {
    DemoPipeline::from_config(config)?
        .run(input_str.as_ref())
        .await
}

/// Find demo videos for PDF bytes in memory.
pub async fn find_demos_from_bytes(
    bytes: &[u8],
    config: &DemoConfig,
) -> Result<DemoOutput, DemosError> {
    DemoPipeline::from_config(config)?
        .run_bytes("<memory>", bytes.to_vec())
        .await
}

/// Synchronous wrapper around [`find_demos`].
///
/// Creates a temporary tokio runtime internally.
pub fn find_demos_sync(
    input_str: impl AsRef<str>,
    config: &DemoConfig,
) -> Result<DemoOutput, DemosError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DemosError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(find_demos(input_str, config))
}

/// Run and write the Markdown cards to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn find_demos_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &DemoConfig,
) -> Result<DemoOutput, DemosError> {
    let output = find_demos(input_str, config).await?;
    write_atomic(output_path.as_ref(), &render_markdown(&output.results)).await?;
    Ok(output)
}

/// Write `contents` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), DemosError> {
    let write_err = |source| DemosError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
