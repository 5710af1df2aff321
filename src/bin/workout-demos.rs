//! CLI binary for workout-demos.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `DemoConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use workout_demos::demos::write_atomic;
use workout_demos::present::{EMPTY_STATE_MESSAGE, EMPTY_STATE_TITLE};
use workout_demos::{
    extract_exercise_names, render_markdown, DemoConfig, DemoOutput, DemoPipeline, DemosError,
    ModalView, ProgressCallback, ResolutionProgressCallback,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per exercise.
/// Exercises finish out of order, so start times are keyed by index.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Spinner until `on_run_start` tells us how many exercises to expect.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Reading");
        bar.set_message("Extracting exercises from PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} exercises  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Searching");
    }

    fn elapsed(&self, index: usize) -> String {
        let ms = self
            .start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);
        dim(&format!("{:.1}s", ms as f64 / 1000.0))
    }
}

impl ResolutionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Searching demos for {total} exercises…"))
        ));
    }

    fn on_exercise_start(&self, index: usize, _total: usize, name: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(name.to_string());
    }

    fn on_exercise_matched(&self, index: usize, total: usize, name: &str, channel: &str) {
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {:<28}  {}  {}",
            green("✓"),
            index + 1,
            total,
            name,
            dim(channel),
            self.elapsed(index),
        ));
        self.bar.inc(1);
    }

    fn on_exercise_unmatched(&self, index: usize, total: usize, name: &str, reason: &str) {
        let msg = if reason.chars().count() > 60 {
            format!("{}\u{2026}", reason.chars().take(59).collect::<String>())
        } else {
            reason.to_string()
        };
        self.bar.println(format!(
            "  {} {:>2}/{:<2}  {:<28}  {}  {}",
            red("✗"),
            index + 1,
            total,
            name,
            red(&msg),
            self.elapsed(index),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total: usize, matched: usize) {
        self.bar.finish_and_clear();
        if matched == total {
            eprintln!("{} {} demos found", green("✔"), bold(&matched.to_string()));
        } else {
            eprintln!(
                "{} {}/{} demos found",
                if matched == 0 { red("✘") } else { cyan("⚠") },
                bold(&matched.to_string()),
                total,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Demo cards as Markdown (stdout)
  workout-demos plan.pdf

  # Write cards to a file
  workout-demos plan.pdf -o demos.md

  # From a URL, JSON output
  workout-demos https://example.com/plan.pdf --json

  # Only list the exercises the model found
  workout-demos --names-only plan.pdf

  # Show player details for one video
  workout-demos plan.pdf --show dQw4w9WgXcQ

ENVIRONMENT VARIABLES:
  SERPER_API_KEY          Video/image search API key (not needed for --names-only)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium, skips auto-download

LIMITS:
  PDFs up to 5 MB. The first 12 exercises are searched, 6 at a time.
"#;

/// Find demonstration videos for the exercises in a workout-plan PDF.
#[derive(Parser, Debug)]
#[command(
    name = "workout-demos",
    version,
    about = "Find demonstration videos for the exercises in a workout-plan PDF",
    long_about = "Extract exercise names from a workout-plan PDF with an LLM, then find one \
demonstration video per exercise, preferring well-known fitness channels.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "WORKOUT_DEMOS_OUTPUT")]
    output: Option<PathBuf>,

    /// LLM model ID used for exercise extraction.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Search API key.
    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true)]
    serper_key: Option<String>,

    /// Search API base URL.
    #[arg(long, env = "WORKOUT_DEMOS_SEARCH_URL")]
    search_url: Option<String>,

    /// Maximum number of exercises to search.
    #[arg(long, env = "WORKOUT_DEMOS_MAX_EXERCISES", default_value_t = workout_demos::DEFAULT_MAX_EXERCISES)]
    max_exercises: usize,

    /// Number of concurrent exercise searches.
    #[arg(short, long, env = "WORKOUT_DEMOS_CONCURRENCY", default_value_t = workout_demos::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Search region (gl).
    #[arg(long, env = "WORKOUT_DEMOS_REGION", default_value = "us")]
    region: String,

    /// Search language (hl).
    #[arg(long, env = "WORKOUT_DEMOS_LANGUAGE", default_value = "en")]
    language: String,

    /// Skip the exercise-icon search; use video thumbnails.
    #[arg(long, env = "WORKOUT_DEMOS_NO_THUMBNAILS")]
    no_thumbnails: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "WORKOUT_DEMOS_PASSWORD")]
    password: Option<String>,

    /// Print the extracted exercise names and stop.
    #[arg(long)]
    names_only: bool,

    /// Print player details for this video id after the run.
    #[arg(long, value_name = "VIDEO_ID")]
    show: Option<String>,

    /// Output structured JSON instead of Markdown.
    #[arg(long, env = "WORKOUT_DEMOS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "WORKOUT_DEMOS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WORKOUT_DEMOS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WORKOUT_DEMOS_QUIET")]
    quiet: bool,

    /// PDF download timeout in seconds.
    #[arg(long, env = "WORKOUT_DEMOS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Search request timeout in seconds.
    #[arg(long, env = "WORKOUT_DEMOS_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    /// Maximum PDF size in megabytes.
    #[arg(long, env = "WORKOUT_DEMOS_MAX_FILE_MB", default_value_t = 5)]
    max_file_mb: u64,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless --verbose is set.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.names_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    ensure_pdf_engine(cli.quiet)?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ResolutionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Names-only mode (no search, no search key) ───────────────────────
    if cli.names_only {
        let names = extract_exercise_names(&cli.input, &config)
            .await
            .map_err(report)?;
        let text = if cli.json {
            serde_json::to_string_pretty(&names).context("Failed to serialise names")?
        } else {
            names
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };
        return emit(&cli, &text).await;
    }

    // ── Full run ─────────────────────────────────────────────────────────
    let pipeline = DemoPipeline::from_config(&config).map_err(report)?;
    let output = pipeline.run(&cli.input).await.map_err(report)?;

    if let Some(ref video_id) = cli.show {
        return show_modal(&cli, &output, video_id);
    }

    let text = if cli.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else {
        render_markdown(&output.results)
    };
    emit(&cli, &text).await?;

    if !cli.quiet {
        if output.results.is_empty() && !cli.json {
            eprintln!("{} {}", red("✘"), bold(EMPTY_STATE_TITLE));
            eprintln!("   {}", dim(EMPTY_STATE_MESSAGE));
        }
        eprintln!(
            "   {}/{} matched  ({} extracted)  {} tokens in / {} out  {}ms",
            output.stats.matched,
            output.stats.attempted,
            output.stats.extracted,
            dim(&output.stats.prompt_tokens.to_string()),
            dim(&output.stats.completion_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Download pdfium on first run; later runs only check the cache path.
fn ensure_pdf_engine(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }

    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.set_message("Connecting…");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `DemoConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DemoConfig> {
    let mut builder = DemoConfig::builder()
        .max_exercises(cli.max_exercises)
        .concurrency(cli.concurrency)
        .region(cli.region.clone())
        .language(cli.language.clone())
        .fetch_thumbnails(!cli.no_thumbnails)
        .max_file_bytes(cli.max_file_mb.saturating_mul(1024 * 1024))
        .download_timeout_secs(cli.download_timeout)
        .request_timeout_secs(cli.request_timeout);

    if let Some(ref m) = cli.model {
        builder = builder.model(m.clone());
    }
    if let Some(ref p) = cli.provider {
        builder = builder.provider_name(p.clone());
    }
    if let Some(ref k) = cli.serper_key {
        builder = builder.serper_api_key(k.clone());
    }
    if let Some(ref u) = cli.search_url {
        builder = builder.search_base_url(u.clone());
    }
    if let Some(ref p) = cli.password {
        builder = builder.password(p.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write to `--output` atomically, or to stdout.
async fn emit(cli: &Cli, text: &str) -> Result<()> {
    if let Some(ref path) = cli.output {
        write_atomic(path, text)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&path.display().to_string()));
        }
        return Ok(());
    }

    let stdout = io::stdout();
    write_text(&mut stdout.lock(), text).context("Failed to write to stdout")
}

/// Write `text`, ending it with a newline if it lacks one.
fn write_text(out: &mut impl Write, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn show_modal(cli: &Cli, output: &DemoOutput, video_id: &str) -> Result<()> {
    let modal = ModalView::for_video(&output.results, video_id)
        .with_context(|| format!("Video '{video_id}' is not among the results"))?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&modal).context("Failed to serialise modal")?
        );
    } else {
        println!("{}", bold(&modal.title));
        if !modal.channel_line.is_empty() {
            println!("{}", modal.channel_line);
        }
        println!("Player:  {}", modal.embed_url);
        println!("YouTube: {}", modal.watch_url);
    }
    Ok(())
}

/// Print the banner text for a fatal error, keep the detail for `anyhow`.
fn report(e: DemosError) -> anyhow::Error {
    eprintln!("{} {}", red("✘"), e.user_message());
    anyhow::Error::new(e)
}
