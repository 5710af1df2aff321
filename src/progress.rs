//! Progress-callback trait for per-exercise resolution events.
//!
//! Inject an [`Arc<dyn ResolutionProgressCallback>`] via
//! [`crate::config::DemoConfigBuilder::progress_callback`] to receive events
//! as the orchestrator resolves each exercise. Callers can forward them to a
//! terminal progress bar, a channel or a UI without the library knowing how
//! the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use workout_demos::{DemoConfig, ResolutionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     matched: AtomicUsize,
//! }
//!
//! impl ResolutionProgressCallback for CountingCallback {
//!     fn on_exercise_matched(&self, _index: usize, _total: usize, name: &str, channel: &str) {
//!         self.matched.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{name}: {channel}");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { matched: AtomicUsize::new(0) });
//!
//! let config = DemoConfig::builder()
//!     .progress_callback(counter as Arc<dyn ResolutionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it resolves each exercise.
///
/// Resolutions run concurrently, so every method may be called from
/// different tasks at once. All methods default to no-ops.
pub trait ResolutionProgressCallback: Send + Sync {
    /// Called once before the first search is issued.
    ///
    /// # Arguments
    /// * `total` — number of exercises that will be attempted (after the cap)
    fn on_run_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before the video search for one exercise.
    ///
    /// `index` is 0-based in input order.
    fn on_exercise_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when an exercise resolved to a video.
    fn on_exercise_matched(&self, index: usize, total: usize, name: &str, channel: &str) {
        let _ = (index, total, name, channel);
    }

    /// Called when an exercise produced no usable video.
    ///
    /// # Arguments
    /// * `reason` — human-readable cause (no results, bad link, failed request)
    fn on_exercise_unmatched(&self, index: usize, total: usize, name: &str, reason: &str) {
        let _ = (index, total, name, reason);
    }

    /// Called once after every exercise has been attempted.
    fn on_run_complete(&self, total: usize, matched: usize) {
        let _ = (total, matched);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ResolutionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DemoConfig`].
pub type ProgressCallback = Arc<dyn ResolutionProgressCallback>;
