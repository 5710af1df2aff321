//! View models for a front end: cards, the demo modal, the empty state.
//!
//! Nothing here touches a real UI. Front ends take a [`Card`] per result and
//! a [`ModalView`] when the user opens one; the CLI renders the same data
//! as Markdown through [`render_markdown`].

use crate::output::{ResolvedExercise, ResultSet};
use serde::Serialize;

/// Heading shown when no exercise resolved to a video.
pub const EMPTY_STATE_TITLE: &str = "No Videos Found";

/// Explanation shown under [`EMPTY_STATE_TITLE`].
pub const EMPTY_STATE_MESSAGE: &str = "We couldn't find any videos for the exercises in your workout plan. Please try a different PDF.";

/// Everything one result card displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub exercise: String,
    pub thumbnail: String,
    pub channel_name: String,
    pub video_id: String,
    pub duration: String,
}

impl From<&ResolvedExercise> for Card {
    fn from(r: &ResolvedExercise) -> Self {
        Self {
            exercise: r.exercise.to_string(),
            thumbnail: r.display_thumbnail().to_string(),
            channel_name: r.video.channel_name.clone(),
            video_id: r.video.video_id.clone(),
            duration: r.video.duration.clone(),
        }
    }
}

/// Cards for every entry, in result order.
pub fn cards(results: &ResultSet) -> Vec<Card> {
    results.iter().map(Card::from).collect()
}

/// What the single-video overlay shows for one video id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalView {
    /// e.g. `"Goblet Squat - Demo"`
    pub title: String,
    /// e.g. `"From: Jeff Nippard"`
    pub channel_line: String,
    pub embed_url: String,
    pub watch_url: String,
}

impl ModalView {
    /// Look `video_id` up in `results` and build the modal contents.
    ///
    /// Returns `None` when the id is not part of the result set.
    pub fn for_video(results: &ResultSet, video_id: &str) -> Option<Self> {
        results.find_by_video_id(video_id).map(Self::from_resolved)
    }

    pub fn from_resolved(r: &ResolvedExercise) -> Self {
        Self {
            title: format!("{} - Demo", r.exercise),
            channel_line: if r.video.channel_name.is_empty() {
                String::new()
            } else {
                format!("From: {}", r.video.channel_name)
            },
            embed_url: embed_url(&r.video.video_id),
            watch_url: watch_url(&r.video.video_id),
        }
    }
}

/// Autoplaying embed URL for the overlay player.
pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?autoplay=1&rel=0&modestbranding=1")
}

/// Link that opens the video on its platform.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Render the result set as Markdown cards, or the empty state.
pub fn render_markdown(results: &ResultSet) -> String {
    if results.is_empty() {
        return format!("## {EMPTY_STATE_TITLE}\n\n{EMPTY_STATE_MESSAGE}\n");
    }

    let mut md = String::from("# Workout Demos\n");
    for card in cards(results) {
        md.push_str(&format!("\n## {}\n\n", card.exercise));
        if !card.thumbnail.is_empty() {
            md.push_str(&format!("![{} thumbnail]({})\n\n", card.exercise, card.thumbnail));
        }
        md.push_str(&format!("- Channel: {}\n", card.channel_name));
        if !card.duration.is_empty() {
            md.push_str(&format!("- Duration: {}\n", card.duration));
        }
        md.push_str(&format!("- Watch: {}\n", watch_url(&card.video_id)));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{ExerciseName, VideoCandidate};

    fn entry(name: &str, id: &str, thumb_override: Option<&str>) -> ResolvedExercise {
        ResolvedExercise {
            exercise: ExerciseName::new(name).unwrap(),
            video: VideoCandidate {
                title: format!("{name} tutorial"),
                thumbnail: "https://i.ytimg.com/vi/x/hq.jpg".into(),
                channel_name: "Jeremy Ethier".into(),
                link: watch_url(id),
                video_id: id.into(),
                duration: "5:01".into(),
            },
            thumbnail_override: thumb_override.map(str::to_string),
        }
    }

    #[test]
    fn modal_for_known_video() {
        let set = ResultSet::new(vec![entry("Goblet Squat", "gs1", None)]);
        let modal = ModalView::for_video(&set, "gs1").unwrap();
        assert_eq!(modal.title, "Goblet Squat - Demo");
        assert_eq!(modal.channel_line, "From: Jeremy Ethier");
        assert_eq!(
            modal.embed_url,
            "https://www.youtube.com/embed/gs1?autoplay=1&rel=0&modestbranding=1"
        );
        assert_eq!(modal.watch_url, "https://www.youtube.com/watch?v=gs1");
    }

    #[test]
    fn modal_for_unknown_video_is_none() {
        let set = ResultSet::new(vec![entry("Goblet Squat", "gs1", None)]);
        assert!(ModalView::for_video(&set, "nope").is_none());
    }

    #[test]
    fn card_uses_override_thumbnail() {
        let card = Card::from(&entry("Plank", "pl", Some("https://img/plank-icon.png")));
        assert_eq!(card.thumbnail, "https://img/plank-icon.png");
    }

    #[test]
    fn markdown_empty_state() {
        let md = render_markdown(&ResultSet::default());
        assert!(md.contains(EMPTY_STATE_TITLE));
    }

    #[test]
    fn markdown_lists_cards_in_order() {
        let set = ResultSet::new(vec![entry("Push Up", "pu", None), entry("Lunge", "lg", None)]);
        let md = render_markdown(&set);
        let push = md.find("## Push Up").unwrap();
        let lunge = md.find("## Lunge").unwrap();
        assert!(push < lunge);
        assert!(md.contains("- Watch: https://www.youtube.com/watch?v=lg"));
        assert!(md.contains("- Duration: 5:01"));
    }
}
