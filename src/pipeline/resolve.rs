//! Video resolution: one exercise name → at most one demo video.
//!
//! 1. Video search with a fixed "tutorial proper form" query.
//! 2. Pick the first hit from an allow-listed channel, else the first hit.
//! 3. Require a recognisable watch link and pull the video id out of it.
//! 4. Look up an override thumbnail through the image search.
//!
//! The resolver never fails: every problem becomes a
//! [`Resolution::NoMatch`] (steps 1–3) or a missing override (step 4).

use crate::config::DemoConfig;
use crate::output::{
    ExerciseName, NoMatchReason, Resolution, ResolvedExercise, VideoCandidate, UNKNOWN_CHANNEL,
};
use crate::pipeline::search::{ImageRecord, SearchParams, VideoRecord, VideoSearch};
use crate::prompts::{logo_query, video_query};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

static RE_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&]+)").unwrap());

/// Resolves exercise names against a [`VideoSearch`] backend.
#[derive(Clone)]
pub struct VideoResolver {
    search: Arc<dyn VideoSearch>,
    video_params: SearchParams,
    image_params: SearchParams,
    preferred_channels: Vec<String>,
    logo_keywords: Vec<String>,
    fetch_thumbnails: bool,
}

impl VideoResolver {
    pub fn new(search: Arc<dyn VideoSearch>, config: &DemoConfig) -> Self {
        Self {
            search,
            video_params: SearchParams {
                region: config.region.clone(),
                language: config.language.clone(),
                num: config.video_results,
            },
            image_params: SearchParams {
                region: config.region.clone(),
                language: config.language.clone(),
                num: config.image_results,
            },
            preferred_channels: config.preferred_channels.clone(),
            logo_keywords: config
                .logo_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            fetch_thumbnails: config.fetch_thumbnails,
        }
    }

    /// Resolve one exercise.
    pub async fn resolve(&self, exercise: &ExerciseName) -> Resolution {
        let query = video_query(exercise.as_str());
        let videos = match self.search.search_videos(&query, &self.video_params).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Video search failed for '{}': {}", exercise, e);
                return Resolution::NoMatch(NoMatchReason::SearchFailed(e.to_string()));
            }
        };

        let Some(best) = select_best_video(&videos, &self.preferred_channels) else {
            debug!("No video results for '{}'", exercise);
            return Resolution::NoMatch(NoMatchReason::NoResults);
        };

        let Some(video_id) = extract_video_id(&best.link) else {
            debug!("Unrecognised link for '{}': {}", exercise, best.link);
            return Resolution::NoMatch(NoMatchReason::UnrecognisedLink {
                link: best.link.clone(),
            });
        };

        let video = VideoCandidate {
            title: best.title.clone(),
            thumbnail: best.thumbnail.clone().unwrap_or_default(),
            channel_name: best
                .channel_name
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            link: best.link.clone(),
            video_id,
            duration: best.duration.clone().unwrap_or_default(),
        };

        let thumbnail_override = if self.fetch_thumbnails {
            self.fetch_logo(exercise).await
        } else {
            None
        };

        Resolution::Matched(ResolvedExercise {
            exercise: exercise.clone(),
            video,
            thumbnail_override,
        })
    }

    /// Image-search thumbnail for a card. Failures mean "no override".
    async fn fetch_logo(&self, exercise: &ExerciseName) -> Option<String> {
        let query = logo_query(exercise.as_str());
        match self.search.search_images(&query, &self.image_params).await {
            Ok(images) => select_logo(&images, &self.logo_keywords).map(str::to_string),
            Err(e) => {
                warn!("Logo search failed for '{}': {}", exercise, e);
                None
            }
        }
    }
}

/// Pick the first video from an allow-listed channel, else the first video.
///
/// Channel matching is a case-sensitive substring test against the channel
/// name exactly as the API returned it.
pub fn select_best_video<'a, S: AsRef<str>>(
    videos: &'a [VideoRecord],
    preferred_channels: &[S],
) -> Option<&'a VideoRecord> {
    videos
        .iter()
        .find(|v| {
            let channel = v.channel_name.as_deref().unwrap_or("");
            preferred_channels
                .iter()
                .any(|p| channel.contains(p.as_ref()))
        })
        .or_else(|| videos.first())
}

/// Pick the first image whose title holds a keyword, else the first image.
///
/// `keywords` must already be lower-case.
pub fn select_logo<'a, S: AsRef<str>>(images: &'a [ImageRecord], keywords: &[S]) -> Option<&'a str> {
    images
        .iter()
        .find(|img| {
            let title = img.title.to_lowercase();
            keywords.iter().any(|k| title.contains(k.as_ref()))
        })
        .or_else(|| images.first())
        .map(|img| img.image_url.as_str())
}

/// Extract the video id from a `watch?v=` or short `youtu.be/` link.
pub fn extract_video_id(link: &str) -> Option<String> {
    RE_VIDEO_ID
        .captures(link)
        .map(|caps| caps[1].to_string())
        .filter(|id| !id.is_empty())
}
