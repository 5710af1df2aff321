//! End-to-end tests against the live search and LLM APIs.
//!
//! Gated behind `E2E_ENABLED` so they do not run in CI unless explicitly
//! requested. Search tests also need `SERPER_API_KEY`; extraction tests need
//! an LLM key (`OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, …). Full-pipeline tests
//! read a workout plan from `./test_cases/workout_plan.pdf`.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use std::path::PathBuf;
use std::sync::Arc;
use workout_demos::{
    find_demos, render_markdown, resolve_exercises, DemoConfig, DemoPipeline, DemosError,
    ExerciseName, ModalView, SerperClient, VideoResolver,
};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_ENABLED and SERPER_API_KEY are set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        if std::env::var("SERPER_API_KEY").is_err() {
            println!("SKIP — SERPER_API_KEY not set");
            return;
        }
    }};
    ($path:expr) => {{
        e2e_skip_unless_ready!();
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

// ── Search only (no LLM) ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_live_resolve_common_exercises() {
    e2e_skip_unless_ready!();

    let config = DemoConfig::default();
    let client = SerperClient::from_config(&config).expect("search client");
    let resolver = VideoResolver::new(Arc::new(client), &config);
    let names: Vec<ExerciseName> = ["Push Up", "Barbell Back Squat", "Plank"]
        .iter()
        .filter_map(ExerciseName::new)
        .collect();

    let results = resolve_exercises(&names, &resolver, &config).await;

    assert!(!results.is_empty(), "common exercises should find videos");
    for entry in &results {
        assert!(!entry.video.video_id.is_empty());
        assert!(entry.video.link.contains(&entry.video.video_id));
        println!(
            "{} → {} ({})",
            entry.exercise, entry.video.link, entry.video.channel_name
        );
    }

    // Input order survives concurrent resolution.
    let order: Vec<&str> = results.iter().map(|r| r.exercise.as_str()).collect();
    let mut expected: Vec<&str> = names.iter().map(|n| n.as_str()).collect();
    expected.retain(|n| order.contains(n));
    assert_eq!(order, expected);
}

#[tokio::test]
async fn test_live_bad_key_yields_no_matches() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let config = DemoConfig::builder()
        .serper_api_key("definitely-not-a-real-key")
        .build()
        .expect("valid config");
    let client = SerperClient::from_config(&config).expect("search client");
    let resolver = VideoResolver::new(Arc::new(client), &config);

    let results =
        resolve_exercises(&[ExerciseName::new("Push Up").unwrap()], &resolver, &config).await;

    assert!(results.is_empty(), "rejected key must not produce a video");
}

// ── Extraction + search (needs LLM API) ──────────────────────────────────────

#[tokio::test]
async fn test_live_run_text() {
    e2e_skip_unless_ready!();

    let config = DemoConfig::builder()
        .max_exercises(3)
        .build()
        .expect("valid config");
    let pipeline = match DemoPipeline::from_config(&config) {
        Ok(p) => p,
        Err(DemosError::ProviderNotConfigured { .. }) => {
            println!("SKIP — no LLM provider configured");
            return;
        }
        Err(e) => panic!("pipeline setup failed: {e}"),
    };

    let text = "WEEK 1 — DAY A\n\
                1. Goblet Squat 3 x 10\n\
                2. Dumbbell Bench Press 3 x 8\n\
                3. Romanian Deadlift 3 x 10\n\
                4. Plank 3 x 45s\n\
                Rest 90 seconds between sets. Drink water.";

    let output = pipeline.run_text(text).await.expect("run should succeed");

    assert!(output.stats.extracted >= 3, "expected at least 3 exercises");
    assert_eq!(output.stats.attempted, 3);
    assert!(output.stats.prompt_tokens > 0);
    println!("Exercises: {:?}", output.exercises);
    println!("{}", render_markdown(&output.results));
}

#[tokio::test]
async fn test_live_full_pipeline_pdf() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("workout_plan.pdf"));

    let config = DemoConfig::default();
    let output = find_demos(path.to_str().unwrap(), &config)
        .await
        .expect("pipeline should succeed");

    assert!(!output.exercises.is_empty());
    assert!(output.stats.attempted <= 12);
    assert_eq!(output.stats.matched, output.results.len());

    if let Some(first) = output.results.iter().next() {
        let modal = ModalView::for_video(&output.results, &first.video.video_id)
            .expect("modal for a returned video");
        assert!(modal.title.ends_with(" - Demo"));
        assert!(modal.embed_url.contains(&first.video.video_id));
    }

    println!(
        "{}/{} matched in {}ms",
        output.stats.matched, output.stats.attempted, output.stats.total_duration_ms
    );
}

#[tokio::test]
async fn test_live_rejects_non_pdf() {
    let path = e2e_skip_unless_ready!(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"));

    let err = find_demos(path.to_str().unwrap(), &DemoConfig::default())
        .await
        .unwrap_err();

    assert!(
        matches!(err, DemosError::NotAPdf { .. } | DemosError::ProviderNotConfigured { .. }),
        "got {err:?}"
    );
}
