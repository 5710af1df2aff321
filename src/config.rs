//! Configuration types for a workout-demo run.
//!
//! Every knob of a run (model, search settings, fan-out bounds, input limits)
//! lives in [`DemoConfig`], built via its [`DemoConfigBuilder`]. One struct
//! is easy to share across tasks, to log, and to compare between two runs.

use crate::error::DemosError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Maximum number of extracted exercises that are looked up per run.
pub const DEFAULT_MAX_EXERCISES: usize = 12;

/// Maximum number of video resolutions in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Largest accepted workout-plan PDF (5 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Default Serper API root.
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://google.serper.dev";

/// Environment variable consulted when no search key is configured.
pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";

/// Fitness channels whose videos win over the first search hit.
///
/// Matched as case-sensitive substrings of the channel name, exactly as the
/// search API returns it.
pub const DEFAULT_PREFERRED_CHANNELS: &[&str] = &[
    "ATHLEAN-X",
    "Jeremy Ethier",
    "Jeff Nippard",
    "FitnessBlender",
    "Buff Dudes",
    "THENX",
    "Bodybuilding.com",
    "Calisthenicmovement",
    "Fitness FAQs",
];

/// Image-title keywords that mark a good card thumbnail (case-insensitive).
pub const DEFAULT_LOGO_KEYWORDS: &[&str] = &["icon", "logo", "transparent", "isolated", "exercise"];

/// Configuration for a workout-demo run.
///
/// Built via [`DemoConfig::builder()`] or using [`DemoConfig::default()`].
///
/// # Example
/// ```rust
/// use workout_demos::DemoConfig;
///
/// let config = DemoConfig::builder()
///     .max_exercises(8)
///     .concurrency(4)
///     .model("llama-3.3-70b-versatile")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_exercises, 8);
/// ```
#[derive(Clone)]
pub struct DemoConfig {
    /// Only the first `max_exercises` extracted names are looked up. Default: 12.
    pub max_exercises: usize,

    /// Video resolutions in flight at once. Default: 6.
    ///
    /// Each resolution issues up to two search requests (video, then image).
    pub concurrency: usize,

    /// LLM model identifier. If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the extraction call. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Serper API key. If None, `SERPER_API_KEY` is read at run time.
    pub serper_api_key: Option<String>,

    /// Search API root. Default: <https://google.serper.dev>.
    pub search_base_url: String,

    /// Search region (`gl`). Default: "us".
    pub region: String,

    /// Search language (`hl`). Default: "en".
    pub language: String,

    /// Video results requested per exercise. Default: 5.
    pub video_results: u32,

    /// Image results requested per exercise. Default: 5.
    pub image_results: u32,

    /// Channel allow-list used to break ties among video results.
    pub preferred_channels: Vec<String>,

    /// Keywords that make an image a preferred thumbnail.
    pub logo_keywords: Vec<String>,

    /// Look up an override thumbnail per matched exercise. Default: true.
    pub fetch_thumbnails: bool,

    /// Upload limit for the input PDF in bytes. Default: 5 MiB.
    pub max_file_bytes: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-request timeout for search calls in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// Optional per-exercise progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            max_exercises: DEFAULT_MAX_EXERCISES,
            concurrency: DEFAULT_CONCURRENCY,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 1024,
            system_prompt: None,
            serper_api_key: None,
            search_base_url: DEFAULT_SEARCH_BASE_URL.to_string(),
            region: "us".to_string(),
            language: "en".to_string(),
            video_results: 5,
            image_results: 5,
            preferred_channels: DEFAULT_PREFERRED_CHANNELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            logo_keywords: DEFAULT_LOGO_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            fetch_thumbnails: true,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            password: None,
            download_timeout_secs: 120,
            request_timeout_secs: 30,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DemoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoConfig")
            .field("max_exercises", &self.max_exercises)
            .field("concurrency", &self.concurrency)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("serper_api_key", &self.serper_api_key.as_ref().map(|_| "<redacted>"))
            .field("search_base_url", &self.search_base_url)
            .field("region", &self.region)
            .field("language", &self.language)
            .field("video_results", &self.video_results)
            .field("image_results", &self.image_results)
            .field("fetch_thumbnails", &self.fetch_thumbnails)
            .field("max_file_bytes", &self.max_file_bytes)
            .finish()
    }
}

impl DemoConfig {
    /// Create a new builder for `DemoConfig`.
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the search key: explicit value first, then `SERPER_API_KEY`.
    pub fn resolve_serper_api_key(&self) -> Result<String, DemosError> {
        if let Some(ref key) = self.serper_api_key {
            if !key.trim().is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(SERPER_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(DemosError::MissingCredential {
                service: "Serper search",
                env_var: SERPER_API_KEY_ENV,
            }),
        }
    }
}

/// Builder for [`DemoConfig`].
pub struct DemoConfigBuilder {
    config: DemoConfig,
}

impl fmt::Debug for DemoConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DemoConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl DemoConfigBuilder {
    pub fn max_exercises(mut self, n: usize) -> Self {
        self.config.max_exercises = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.serper_api_key = Some(key.into());
        self
    }

    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.search_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn region(mut self, gl: impl Into<String>) -> Self {
        self.config.region = gl.into();
        self
    }

    pub fn language(mut self, hl: impl Into<String>) -> Self {
        self.config.language = hl.into();
        self
    }

    pub fn video_results(mut self, n: u32) -> Self {
        self.config.video_results = n;
        self
    }

    pub fn image_results(mut self, n: u32) -> Self {
        self.config.image_results = n;
        self
    }

    pub fn preferred_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.preferred_channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn logo_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.logo_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn fetch_thumbnails(mut self, v: bool) -> Self {
        self.config.fetch_thumbnails = v;
        self
    }

    pub fn max_file_bytes(mut self, n: u64) -> Self {
        self.config.max_file_bytes = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DemoConfig, DemosError> {
        let c = &self.config;
        if c.max_exercises == 0 {
            return Err(DemosError::InvalidConfig(
                "max_exercises must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(DemosError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        for (label, n) in [("video_results", c.video_results), ("image_results", c.image_results)] {
            if !(1..=100).contains(&n) {
                return Err(DemosError::InvalidConfig(format!(
                    "{label} must be 1–100, got {n}"
                )));
            }
        }
        if c.max_file_bytes == 0 {
            return Err(DemosError::InvalidConfig(
                "max_file_bytes must be ≥ 1".into(),
            ));
        }
        if !c.search_base_url.starts_with("http://") && !c.search_base_url.starts_with("https://") {
            return Err(DemosError::InvalidConfig(format!(
                "search_base_url must be an HTTP(S) URL, got '{}'",
                c.search_base_url
            )));
        }
        Ok(self.config)
    }
}
