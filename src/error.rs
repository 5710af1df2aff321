//! Error types for the workout-demos library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DemosError`] — **Fatal**: the run cannot produce a result set at all
//!   (bad input file, the model call failed, no exercises found). Returned as
//!   `Err(DemosError)` from the top-level `find_demos*` functions.
//!
//! * [`SearchError`] — **Non-fatal**: one search request failed. It never
//!   leaves the video resolver; it is folded into
//!   [`crate::output::NoMatchReason::SearchFailed`] (video search) or into a
//!   missing override thumbnail (image search), so one bad exercise never
//!   aborts the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Banner text shared by both extraction failure kinds.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Failed to extract exercises from the PDF. Please try again.";

/// Banner text for a run whose extraction produced zero names.
pub const NO_EXERCISES_MESSAGE: &str =
    "No exercises found in the PDF. Please make sure you uploaded a workout plan PDF.";

/// All fatal errors returned by the workout-demos library.
#[derive(Debug, Error)]
pub enum DemosError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("'{source_name}' is not a PDF file.\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: [u8; 4] },

    /// The document exceeds the configured upload limit.
    #[error("'{source_name}' is too large ({size} bytes). Please select a file under {limit} bytes.")]
    FileTooLarge {
        source_name: String,
        size: u64,
        limit: u64,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{source_name}' is corrupt: {detail}")]
    CorruptPdf { source_name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{source_name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { source_name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{source_name}'")]
    WrongPassword { source_name: String },

    /// The PDF opened fine but carries no extractable text (e.g. a scan).
    #[error("PDF '{source_name}' contains no extractable text")]
    NoText { source_name: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The model endpoint could not be reached or answered with an error.
    #[error("Exercise extraction request failed: {detail}")]
    ExtractionRequest { detail: String },

    /// The model answered, but no JSON string array could be recovered.
    #[error("Could not parse the exercise list from the model response: {detail}")]
    ExtractionParse { detail: String },

    /// Extraction succeeded but yielded zero exercise names.
    #[error("No exercises found in the PDF. Please make sure you uploaded a workout plan PDF.")]
    EmptyExtraction,

    // ── Provider / credential errors ──────────────────────────────────────
    /// The configured LLM provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// A required secret was neither configured nor found in the environment.
    #[error("Missing credential for {service}.\nSet {env_var} or pass it explicitly.")]
    MissingCredential {
        service: &'static str,
        env_var: &'static str,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DemosError {
    /// The single human-readable message a front end should show in its
    /// error banner.
    ///
    /// Extraction request and parse failures collapse into one message; the
    /// detail stays available through `Display` for logs.
    pub fn user_message(&self) -> String {
        match self {
            DemosError::ExtractionRequest { .. } | DemosError::ExtractionParse { .. } => {
                EXTRACTION_FAILED_MESSAGE.to_string()
            }
            DemosError::EmptyExtraction => NO_EXERCISES_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// `true` for the errors raised by the exercise-name extraction stage.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            DemosError::ExtractionRequest { .. }
                | DemosError::ExtractionParse { .. }
                | DemosError::EmptyExtraction
        )
    }
}

/// A non-fatal failure of one search request.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SearchError {
    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("search request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("search API returned HTTP {status}")]
    Status { status: u16 },

    /// The body was not the expected JSON shape.
    #[error("search response could not be decoded: {0}")]
    Decode(String),
}
