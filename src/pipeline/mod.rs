//! Pipeline stages for finding workout demo videos.
//!
//! Each submodule implements exactly one step, so each is testable alone
//! and can be swapped (another search backend, another text extractor)
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──▶ llm ──▶ postprocess ──▶ resolve (× N) ──▶ ResultSet
//! (path/URL) (pdfium) (names)  (JSON array)   (search)
//! ```
//!
//! 1. [`input`]       — read or download the PDF, enforce magic bytes and size
//! 2. [`text`]        — extract page text; runs in `spawn_blocking`
//! 3. [`llm`]         — ask the model for exercise names (single attempt)
//! 4. [`postprocess`] — recover the JSON array from free-form model output
//! 5. [`search`]      — video and image search over HTTP
//! 6. [`resolve`]     — choose one video and a thumbnail per exercise

pub mod input;
pub mod llm;
pub mod postprocess;
pub mod resolve;
pub mod search;
pub mod text;
