//! Web search: video results and image results for one query.
//!
//! [`VideoSearch`] is the seam the resolver talks to; [`SerperClient`] is the
//! production implementation over the Serper API (`X-API-KEY` header, JSON
//! bodies). Each call is a single attempt and every failure is reported as
//! a [`SearchError`] for the resolver to absorb.

use crate::config::DemoConfig;
use crate::error::{DemosError, SearchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Region, language and result count for one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub region: String,
    pub language: String,
    pub num: u32,
}

/// One video search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// One image search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
}

/// Video and image search backend.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search_videos(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<VideoRecord>, SearchError>;

    async fn search_images(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ImageRecord>, SearchError>;
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    hl: &'a str,
    num: u32,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    images: Vec<ImageRecord>,
}

/// Serper API client.
///
/// Reuses one `reqwest::Client` (connection pool) for every request of a run.
pub struct SerperClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Create a client for `base_url` (e.g. `https://google.serper.dev`).
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, DemosError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DemosError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the run config, resolving the API key.
    pub fn from_config(config: &DemoConfig) -> Result<Self, DemosError> {
        Self::new(
            config.resolve_serper_api_key()?,
            config.search_base_url.clone(),
            config.request_timeout_secs,
        )
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &SerperRequest<'_>,
    ) -> Result<T, SearchError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {} q={:?}", url, body.q);

        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SearchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl VideoSearch for SerperClient {
    async fn search_videos(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<VideoRecord>, SearchError> {
        let body = SerperRequest {
            q: query,
            gl: &params.region,
            hl: &params.language,
            num: params.num,
            kind: None,
        };
        let parsed: VideosResponse = self.post("videos", &body).await?;
        debug!("{} video results for {:?}", parsed.videos.len(), query);
        Ok(parsed.videos)
    }

    async fn search_images(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ImageRecord>, SearchError> {
        let body = SerperRequest {
            q: query,
            gl: &params.region,
            hl: &params.language,
            num: params.num,
            kind: Some("images"),
        };
        let parsed: ImagesResponse = self.post("search", &body).await?;
        debug!("{} image results for {:?}", parsed.images.len(), query);
        Ok(parsed.images)
    }
}
