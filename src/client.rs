//! Client for the research platform API.
//!
//! The platform is treated as an opaque, bearer-authenticated JSON data
//! source: studies, per-channel segment metadata, seizure label groups, and
//! raw channel samples. An async client does the HTTP work; the pipeline
//! runs synchronously through a blocking wrapper.

use crate::core::labeling::SeizureEvent;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "EPIWEAR_API_URL";
/// Environment variable holding the bearer token.
pub const API_TOKEN_ENV: &str = "EPIWEAR_API_TOKEN";

/// Platform API connection settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL, e.g. `https://api.research-platform.example`
    pub base_url: String,
    /// Bearer authentication token
    pub token: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Build a config from `default_base_url` and the environment.
    ///
    /// `EPIWEAR_API_URL` overrides the base URL; the token must come from
    /// `EPIWEAR_API_TOKEN`.
    pub fn from_env(default_base_url: &str) -> Result<Self, ApiError> {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| default_base_url.to_string());
        let token = std::env::var(API_TOKEN_ENV)
            .map_err(|_| ApiError::Config(format!("{API_TOKEN_ENV} is not set")))?;
        if base_url.is_empty() {
            return Err(ApiError::Config("API base URL is empty".to_string()));
        }
        Ok(Self::new(base_url, token))
    }

    /// Study lookup endpoint.
    pub fn studies_url(&self) -> String {
        format!("{}/v1/studies", self.base_url)
    }

    /// Per-channel segment metadata for a study.
    pub fn metadata_url(&self, study_id: &str) -> String {
        format!("{}/v1/studies/{study_id}/metadata", self.base_url)
    }

    /// Label groups for a study.
    pub fn label_groups_url(&self, study_id: &str) -> String {
        format!("{}/v1/studies/{study_id}/label-groups", self.base_url)
    }

    /// Labels in a label group.
    pub fn labels_url(&self, group_id: &str) -> String {
        format!("{}/v1/label-groups/{group_id}/labels", self.base_url)
    }

    /// Raw samples of a data segment.
    pub fn segment_data_url(&self, segment_id: &str) -> String {
        format!("{}/v1/segments/{segment_id}/data", self.base_url)
    }
}

/// Platform client error types.
#[derive(Debug)]
pub enum ApiError {
    /// Configuration error
    Config(String),
    /// Network/HTTP error
    Network(String),
    /// Server returned an error response
    Server { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "API config error: {msg}"),
            ApiError::Network(msg) => write!(f, "API network error: {msg}"),
            ApiError::Server { status, message } => {
                write!(f, "API server error ({status}): {message}")
            }
            ApiError::Decode(msg) => write!(f, "API decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// A study as returned by the lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySummary {
    pub id: String,
    pub name: String,
}

/// One channel-segment row of a study's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSegment {
    pub study_id: String,
    /// Channel (sensor) name, e.g. "Acc Mag"
    pub channel_name: String,
    /// Sampling rate of the channel group (Hz)
    pub sample_rate: f64,
    pub segment_id: String,
    /// Segment start (epoch ms)
    pub start_time: i64,
    /// Segment duration (ms)
    pub duration: i64,
}

/// A group of clinical annotations attached to a study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelGroup {
    pub id: String,
    pub name: String,
}

/// One annotated seizure in a label group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeizureLabel {
    pub id: String,
    /// Seizure onset (epoch ms)
    pub start_time: i64,
    /// Event duration (ms)
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<&SeizureLabel> for SeizureEvent {
    fn from(label: &SeizureLabel) -> Self {
        SeizureEvent::new(label.start_time, label.duration)
    }
}

/// One raw sample of a data segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChannelSample {
    /// Sample timestamp (epoch ms)
    pub time: i64,
    /// Reading; `null` for missing samples
    pub value: Option<f64>,
}

/// Async platform client.
pub struct PlatformClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl PlatformClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Find a study by exact name. `None` when the platform knows no such study.
    pub async fn find_study(&self, name: &str) -> Result<Option<StudySummary>, ApiError> {
        let studies: Vec<StudySummary> = self
            .get(&self.config.studies_url(), &[("name", name)])
            .await?;
        Ok(studies.into_iter().find(|s| s.name == name))
    }

    /// Per-channel segment metadata for a study.
    pub async fn study_metadata(&self, study_id: &str) -> Result<Vec<ChannelSegment>, ApiError> {
        self.get(&self.config.metadata_url(study_id), &[]).await
    }

    /// Label groups attached to a study.
    pub async fn label_groups(&self, study_id: &str) -> Result<Vec<LabelGroup>, ApiError> {
        self.get(&self.config.label_groups_url(study_id), &[]).await
    }

    /// Seizure annotations in a label group.
    pub async fn labels(&self, group_id: &str) -> Result<Vec<SeizureLabel>, ApiError> {
        self.get(&self.config.labels_url(group_id), &[]).await
    }

    /// Raw samples of a data segment.
    pub async fn segment_data(&self, segment_id: &str) -> Result<Vec<ChannelSample>, ApiError> {
        self.get(&self.config.segment_data_url(segment_id), &[])
            .await
    }

    async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Blocking platform client for the synchronous pipeline.
pub struct BlockingClient {
    inner: PlatformClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Config(format!("failed to create runtime: {e}")))?;
        Ok(Self {
            inner: PlatformClient::new(config)?,
            runtime,
        })
    }

    pub fn find_study(&self, name: &str) -> Result<Option<StudySummary>, ApiError> {
        self.runtime.block_on(self.inner.find_study(name))
    }

    pub fn study_metadata(&self, study_id: &str) -> Result<Vec<ChannelSegment>, ApiError> {
        self.runtime.block_on(self.inner.study_metadata(study_id))
    }

    pub fn label_groups(&self, study_id: &str) -> Result<Vec<LabelGroup>, ApiError> {
        self.runtime.block_on(self.inner.label_groups(study_id))
    }

    pub fn labels(&self, group_id: &str) -> Result<Vec<SeizureLabel>, ApiError> {
        self.runtime.block_on(self.inner.labels(group_id))
    }

    pub fn segment_data(&self, segment_id: &str) -> Result<Vec<ChannelSample>, ApiError> {
        self.runtime.block_on(self.inner.segment_data(segment_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_urls() {
        let config = ApiConfig::new("https://api.example.org/", "test-token");
        assert_eq!(config.studies_url(), "https://api.example.org/v1/studies");
        assert_eq!(
            config.metadata_url("st1"),
            "https://api.example.org/v1/studies/st1/metadata"
        );
        assert_eq!(
            config.labels_url("lg1"),
            "https://api.example.org/v1/label-groups/lg1/labels"
        );
        assert_eq!(
            config.segment_data_url("seg1"),
            "https://api.example.org/v1/segments/seg1/data"
        );
    }

    #[test]
    fn test_seizure_label_to_event() {
        let label = SeizureLabel {
            id: "l1".to_string(),
            start_time: 1_000,
            duration: 500,
            note: None,
        };
        let event = SeizureEvent::from(&label);
        assert_eq!(event.start_time, 1_000);
        assert_eq!(event.duration, 500);
    }

    #[test]
    fn test_channel_sample_null_decoding() {
        let samples: Vec<ChannelSample> =
            serde_json::from_str(r#"[{"time": 1, "value": 0.5}, {"time": 2, "value": null}]"#)
                .unwrap();
        assert_eq!(samples[0].value, Some(0.5));
        assert_eq!(samples[1].value, None);
    }
}
