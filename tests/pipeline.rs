//! Pipeline tests with in-memory fakes for the text extractor, the LLM
//! extractor and the search backend. No network, no pdfium.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use workout_demos::pipeline::input::ResolvedInput;
use workout_demos::{
    resolve_exercises, resolve_stream, DemoConfig, DemoPipeline, DemosError, ExerciseExtractor,
    ExerciseName, Extraction, ImageRecord, ModalView, NoMatchReason, Resolution,
    ResolutionProgressCallback, SearchError, SearchParams, TextExtractor, VideoRecord,
    VideoResolver, VideoSearch,
};

// ── Fakes ────────────────────────────────────────────────────────────────────

const QUERY_SUFFIX: &str = " exercise tutorial proper form";

/// Canned text; never looks at the bytes.
struct FakeText(String);

#[async_trait]
impl TextExtractor for FakeText {
    async fn extract_text(
        &self,
        _input: ResolvedInput,
        _password: Option<&str>,
    ) -> Result<String, DemosError> {
        Ok(self.0.clone())
    }
}

/// Returns a fixed name list and records the text it was given.
struct FakeExtractor {
    names: Vec<&'static str>,
    seen: Mutex<Vec<String>>,
}

impl FakeExtractor {
    fn new(names: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            names,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ExerciseExtractor for FakeExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction, DemosError> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(Extraction {
            names: self.names.iter().filter_map(ExerciseName::new).collect(),
            prompt_tokens: 100,
            completion_tokens: 20,
        })
    }
}

/// Search backend keyed by exercise name.
///
/// Names without an entry get one generic video. Delays simulate slow
/// responses; in-flight counters track concurrency.
#[derive(Default)]
struct FakeSearch {
    videos: HashMap<String, Vec<VideoRecord>>,
    failing: Vec<String>,
    delays_ms: HashMap<String, u64>,
    images_fail: bool,
    video_calls: AtomicUsize,
    image_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    queried: Mutex<Vec<String>>,
}

impl FakeSearch {
    fn with_videos(mut self, name: &str, videos: Vec<VideoRecord>) -> Self {
        self.videos.insert(name.to_string(), videos);
        self
    }

    fn with_delay(mut self, name: &str, ms: u64) -> Self {
        self.delays_ms.insert(name.to_string(), ms);
        self
    }
}

fn video(id: &str, channel: Option<&str>) -> VideoRecord {
    VideoRecord {
        title: format!("video {id}"),
        link: format!("https://www.youtube.com/watch?v={id}"),
        thumbnail: Some(format!("https://i.ytimg.com/vi/{id}/hq.jpg")),
        channel_name: channel.map(str::to_string),
        duration: Some("3:30".into()),
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[async_trait]
impl VideoSearch for FakeSearch {
    async fn search_videos(
        &self,
        query: &str,
        _params: &SearchParams,
    ) -> Result<Vec<VideoRecord>, SearchError> {
        let name = query.trim_end_matches(QUERY_SUFFIX).to_string();
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(name.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delays_ms.get(&name).copied().unwrap_or(5);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&name) {
            return Err(SearchError::Status { status: 500 });
        }
        Ok(self
            .videos
            .get(&name)
            .cloned()
            .unwrap_or_else(|| vec![video(&slug(&name), Some("Some Channel"))]))
    }

    async fn search_images(
        &self,
        _query: &str,
        _params: &SearchParams,
    ) -> Result<Vec<ImageRecord>, SearchError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.images_fail {
            return Err(SearchError::Request("connection reset".into()));
        }
        Ok(vec![ImageRecord {
            title: "exercise icon".into(),
            image_url: "https://img.example/icon.png".into(),
        }])
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("workout_demos=debug"))
        .with_test_writer()
        .try_init();
}

fn names(list: &[&str]) -> Vec<ExerciseName> {
    list.iter().filter_map(ExerciseName::new).collect()
}

fn config() -> DemoConfig {
    DemoConfig::builder()
        .serper_api_key("test-key")
        .build()
        .unwrap()
}

fn pipeline(
    search: Arc<FakeSearch>,
    extractor: Arc<FakeExtractor>,
    config: DemoConfig,
) -> DemoPipeline {
    DemoPipeline::new(
        Arc::new(FakeText("Day 1: Push Up 3x10, Squat 3x12".into())),
        extractor,
        VideoResolver::new(search, &config),
        config,
    )
}

// ── Orchestrator ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unmatched_exercise_is_left_out() {
    init_tracing();
    let search = Arc::new(
        FakeSearch::default()
            .with_videos("Push Up", vec![video("pu1", Some("Jeremy Ethier"))])
            .with_videos("Squat", vec![]),
    );
    let p = pipeline(search, FakeExtractor::new(vec!["Push Up", "Squat"]), config());

    let out = p.run_text("plan text").await.unwrap();

    assert_eq!(out.results.len(), 1);
    let entry = out.results.iter().next().unwrap();
    assert_eq!(entry.exercise.as_str(), "Push Up");
    assert_eq!(entry.video.video_id, "pu1");
    assert_eq!(entry.video.channel_name, "Jeremy Ethier");
    assert_eq!(out.stats.extracted, 2);
    assert_eq!(out.stats.attempted, 2);
    assert_eq!(out.stats.matched, 1);
    assert_eq!(out.stats.unmatched, 1);
    assert_eq!(out.stats.prompt_tokens, 100);
}

#[tokio::test]
async fn only_first_twelve_are_searched() {
    let list: Vec<&'static str> = vec![
        "E01", "E02", "E03", "E04", "E05", "E06", "E07", "E08", "E09", "E10", "E11", "E12",
        "E13", "E14", "E15",
    ];
    let search = Arc::new(FakeSearch::default());
    let p = pipeline(search.clone(), FakeExtractor::new(list), config());

    let out = p.run_text("plan").await.unwrap();

    assert_eq!(search.video_calls.load(Ordering::SeqCst), 12);
    assert_eq!(out.stats.extracted, 15);
    assert_eq!(out.stats.attempted, 12);
    assert_eq!(out.exercises.len(), 15);
    let queried = search.queried.lock().unwrap();
    assert!(!queried.iter().any(|n| n == "E13" || n == "E14" || n == "E15"));
}

#[tokio::test]
async fn empty_extraction_fails_before_any_search() {
    let search = Arc::new(FakeSearch::default());
    let p = pipeline(search.clone(), FakeExtractor::new(vec![]), config());

    let err = p.run_text("no exercises here").await.unwrap_err();

    assert!(matches!(err, DemosError::EmptyExtraction));
    assert_eq!(search.video_calls.load(Ordering::SeqCst), 0);
    assert_eq!(search.image_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn results_keep_input_order_when_later_items_finish_first() {
    let search = Arc::new(
        FakeSearch::default()
            .with_delay("Deadlift", 120)
            .with_delay("Row", 60)
            .with_delay("Plank", 1),
    );
    let cfg = config();
    let resolver = VideoResolver::new(search, &cfg);

    let set = resolve_exercises(&names(&["Deadlift", "Row", "Plank"]), &resolver, &cfg).await;

    let order: Vec<&str> = set.iter().map(|r| r.exercise.as_str()).collect();
    assert_eq!(order, vec!["Deadlift", "Row", "Plank"]);
}

#[tokio::test]
async fn logo_failure_keeps_the_exercise() {
    let search = Arc::new(FakeSearch {
        images_fail: true,
        ..FakeSearch::default()
    });
    let cfg = config();
    let resolver = VideoResolver::new(search.clone(), &cfg);

    let set = resolve_exercises(&names(&["Lunge"]), &resolver, &cfg).await;

    assert_eq!(set.len(), 1);
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.thumbnail_override, None);
    assert_eq!(entry.display_thumbnail(), "https://i.ytimg.com/vi/lunge/hq.jpg");
    assert_eq!(search.image_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn logo_override_is_used_when_found() {
    let search = Arc::new(FakeSearch::default());
    let cfg = config();
    let resolver = VideoResolver::new(search, &cfg);

    let set = resolve_exercises(&names(&["Lunge"]), &resolver, &cfg).await;

    let entry = set.iter().next().unwrap();
    assert_eq!(entry.display_thumbnail(), "https://img.example/icon.png");
}

#[tokio::test]
async fn thumbnails_disabled_skips_image_search() {
    let search = Arc::new(FakeSearch::default());
    let cfg = DemoConfig::builder()
        .serper_api_key("k")
        .fetch_thumbnails(false)
        .build()
        .unwrap();
    let resolver = VideoResolver::new(search.clone(), &cfg);

    let set = resolve_exercises(&names(&["Lunge", "Row"]), &resolver, &cfg).await;

    assert_eq!(set.len(), 2);
    assert_eq!(search.image_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn in_flight_searches_never_exceed_concurrency() {
    let search = Arc::new(FakeSearch::default());
    let cfg = DemoConfig::builder()
        .serper_api_key("k")
        .concurrency(3)
        .build()
        .unwrap();
    let resolver = VideoResolver::new(search.clone(), &cfg);
    let list = names(&["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]);

    let set = resolve_exercises(&list, &resolver, &cfg).await;

    assert_eq!(set.len(), 10);
    let max = search.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 3, "saw {max} concurrent searches");
    assert!(max >= 1);
}

#[tokio::test]
async fn allow_listed_channel_wins_over_first_hit() {
    let search = Arc::new(FakeSearch::default().with_videos(
        "Bench Press",
        vec![
            video("random", Some("Gym Bro Vlogs")),
            video("other", None),
            video("nippard", Some("Jeff Nippard")),
        ],
    ));
    let cfg = config();
    let resolver = VideoResolver::new(search, &cfg);

    let set = resolve_exercises(&names(&["Bench Press"]), &resolver, &cfg).await;

    assert_eq!(set.iter().next().unwrap().video.video_id, "nippard");
}

#[tokio::test]
async fn search_failure_and_bad_link_are_no_match() {
    init_tracing();
    let mut fake = FakeSearch::default().with_videos(
        "Curl",
        vec![VideoRecord {
            title: "curl".into(),
            link: "https://vimeo.com/12345".into(),
            ..VideoRecord::default()
        }],
    );
    fake.failing.push("Dip".into());
    let cfg = config();
    let resolver = VideoResolver::new(Arc::new(fake), &cfg);

    match resolver.resolve(&ExerciseName::new("Dip").unwrap()).await {
        Resolution::NoMatch(NoMatchReason::SearchFailed(_)) => {}
        other => panic!("expected SearchFailed, got {other:?}"),
    }
    match resolver.resolve(&ExerciseName::new("Curl").unwrap()).await {
        Resolution::NoMatch(NoMatchReason::UnrecognisedLink { link }) => {
            assert_eq!(link, "https://vimeo.com/12345")
        }
        other => panic!("expected UnrecognisedLink, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_channel_name_gets_placeholder() {
    let search = Arc::new(FakeSearch::default().with_videos("Burpee", vec![video("bp", None)]));
    let cfg = config();
    let resolver = VideoResolver::new(search, &cfg);

    let set = resolve_exercises(&names(&["Burpee"]), &resolver, &cfg).await;

    assert_eq!(set.iter().next().unwrap().video.channel_name, "YouTube Channel");
}

// ── Progress callbacks ───────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    started: AtomicUsize,
    matched: AtomicUsize,
    unmatched: AtomicUsize,
    run: Mutex<Option<(usize, usize)>>,
}

impl ResolutionProgressCallback for Recorder {
    fn on_exercise_start(&self, _index: usize, _total: usize, _name: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_exercise_matched(&self, _index: usize, _total: usize, _name: &str, _channel: &str) {
        self.matched.fetch_add(1, Ordering::SeqCst);
    }
    fn on_exercise_unmatched(&self, _index: usize, _total: usize, _name: &str, _reason: &str) {
        self.unmatched.fetch_add(1, Ordering::SeqCst);
    }
    fn on_run_complete(&self, total: usize, matched: usize) {
        *self.run.lock().unwrap() = Some((total, matched));
    }
}

#[tokio::test]
async fn progress_callback_sees_every_exercise() {
    let recorder = Arc::new(Recorder::default());
    let search = Arc::new(FakeSearch::default().with_videos("Squat", vec![]));
    let cfg = DemoConfig::builder()
        .serper_api_key("k")
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let resolver = VideoResolver::new(search, &cfg);

    resolve_exercises(&names(&["Push Up", "Squat", "Row"]), &resolver, &cfg).await;

    assert_eq!(recorder.started.load(Ordering::SeqCst), 3);
    assert_eq!(recorder.matched.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.unmatched.load(Ordering::SeqCst), 1);
    assert_eq!(*recorder.run.lock().unwrap(), Some((3, 2)));
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn stream_yields_every_attempted_exercise() {
    let search = Arc::new(FakeSearch::default().with_videos("Squat", vec![]));
    let cfg = DemoConfig::builder()
        .serper_api_key("k")
        .max_exercises(2)
        .build()
        .unwrap();
    let resolver = VideoResolver::new(search, &cfg);

    let mut items: Vec<_> = resolve_stream(names(&["Push Up", "Squat", "Row"]), resolver, &cfg)
        .collect()
        .await;
    items.sort_by_key(|i| i.index);

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].exercise.as_str(), "Push Up");
    assert!(items[0].resolution.is_match());
    assert!(!items[1].resolution.is_match());
}

// ── Whole pipeline ───────────────────────────────────────────────────────────

#[tokio::test]
async fn run_bytes_rejects_non_pdf() {
    let search = Arc::new(FakeSearch::default());
    let extractor = FakeExtractor::new(vec!["Push Up"]);
    let p = pipeline(search.clone(), extractor.clone(), config());

    let err = p
        .run_bytes("plan.docx", b"PK\x03\x04 zip".to_vec())
        .await
        .unwrap_err();

    assert!(matches!(err, DemosError::NotAPdf { .. }));
    assert!(extractor.seen.lock().unwrap().is_empty());
    assert_eq!(search.video_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn run_bytes_rejects_oversized_upload() {
    let cfg = DemoConfig::builder()
        .serper_api_key("k")
        .max_file_bytes(16)
        .build()
        .unwrap();
    let p = pipeline(Arc::new(FakeSearch::default()), FakeExtractor::new(vec![]), cfg);

    let mut bytes = b"%PDF-1.7\n".to_vec();
    bytes.resize(64, b' ');
    let err = p.run_bytes("big.pdf", bytes).await.unwrap_err();

    assert!(matches!(err, DemosError::FileTooLarge { size: 64, limit: 16, .. }));
}

#[tokio::test]
async fn run_bytes_passes_text_to_extractor_and_builds_modal() {
    let search = Arc::new(
        FakeSearch::default().with_videos("Push Up", vec![video("pu9", Some("ATHLEAN-X™"))]),
    );
    let extractor = FakeExtractor::new(vec!["Push Up"]);
    let p = pipeline(search, extractor.clone(), config());

    let out = p
        .run_bytes("plan.pdf", b"%PDF-1.4\n...".to_vec())
        .await
        .unwrap();

    assert_eq!(
        extractor.seen.lock().unwrap().as_slice(),
        ["Day 1: Push Up 3x10, Squat 3x12"]
    );
    let modal = ModalView::for_video(&out.results, "pu9").unwrap();
    assert_eq!(modal.title, "Push Up - Demo");
    assert_eq!(modal.channel_line, "From: ATHLEAN-X™");
    assert!(ModalView::for_video(&out.results, "missing").is_none());
}
