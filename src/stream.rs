//! Streaming resolution API: emit each exercise as soon as it resolves.
//!
//! [`crate::demos::resolve_exercises`] waits for every search before
//! returning. [`resolve_stream`] instead yields one [`ResolvedItem`] per
//! attempted exercise as each finishes, so a UI can show cards while the
//! rest are still loading. Items arrive in completion order; `index` gives
//! the input position for callers that need to re-order.

use crate::config::DemoConfig;
use crate::output::{ExerciseName, Resolution};
use crate::pipeline::resolve::VideoResolver;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// One finished resolution.
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    /// 0-based position in the input list.
    pub index: usize,
    pub exercise: ExerciseName,
    pub resolution: Resolution,
}

/// A boxed stream of resolutions.
pub type ResolutionStream = Pin<Box<dyn Stream<Item = ResolvedItem> + Send>>;

/// Resolve the first `config.max_exercises` names, streaming outcomes.
///
/// Concurrency is bounded by `config.concurrency`, as in the eager API.
/// No-match outcomes are yielded too; filter with
/// [`Resolution::is_match`] to keep only videos.
pub fn resolve_stream(
    names: Vec<ExerciseName>,
    resolver: VideoResolver,
    config: &DemoConfig,
) -> ResolutionStream {
    let capped: Vec<ExerciseName> = names.into_iter().take(config.max_exercises).collect();
    info!("Starting streaming resolution of {} exercises", capped.len());

    let s = stream::iter(capped.into_iter().enumerate().map(move |(index, exercise)| {
        let resolver = resolver.clone();
        async move {
            let resolution = resolver.resolve(&exercise).await;
            ResolvedItem {
                index,
                exercise,
                resolution,
            }
        }
    }))
    .buffer_unordered(config.concurrency);

    Box::pin(s)
}
