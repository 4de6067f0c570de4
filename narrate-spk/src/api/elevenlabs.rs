//! ElevenLabs HTTP client

use crate::api::{AudioStream, SpeechApi, SynthesisRequest};
use crate::config::ApiConfig;
use crate::error::SpeechError;
use crate::voice_catalog::{Voice, VoiceFilter};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Voices requested per listing call
pub const VOICE_PAGE_SIZE: u32 = 100;

const API_KEY_HEADER: &str = "xi-api-key";

#[derive(Debug, Deserialize)]
struct VoicesResponse {
    #[serde(default)]
    voices: Vec<Voice>,
}

/// reqwest-backed [`SpeechApi`] for the ElevenLabs REST API
pub struct ElevenLabsClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl ElevenLabsClient {
    /// Create a new client
    pub fn new(config: &ApiConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SpeechError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SpeechError::Config(format!("Invalid API base URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SpeechError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SpeechError::Config(format!("API base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn voices_url(&self, filter: &VoiceFilter) -> Result<Url, SpeechError> {
        let mut url = self.endpoint(&["v2", "voices"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(ref search) = filter.name_contains {
                query.append_pair("search", search);
            }
            if let Some(ref category) = filter.category {
                query.append_pair("category", category);
            }
            query.append_pair("page_size", &VOICE_PAGE_SIZE.to_string());
        }
        Ok(url)
    }

    fn synthesis_url(&self, voice_id: &str, output_format: Option<&str>) -> Result<Url, SpeechError> {
        let mut url = self.endpoint(&["v1", "text-to-speech", voice_id])?;
        if let Some(format) = output_format {
            url.query_pairs_mut().append_pair("output_format", format);
        }
        Ok(url)
    }
}

#[async_trait]
impl SpeechApi for ElevenLabsClient {
    async fn list_voices(&self, filter: &VoiceFilter) -> Result<Vec<Voice>, SpeechError> {
        let url = self.voices_url(filter)?;
        debug!("Listing voices: {}", url);

        let response = self.client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| SpeechError::Transport(format!("Voice listing request failed: {}", e)))?;

        let response = check_status(response, "Failed to fetch voices").await?;

        let body: VoicesResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::Transport(format!("Failed to parse voice listing: {}", e)))?;

        debug!("Provider returned {} voices", body.voices.len());
        Ok(body.voices)
    }

    async fn synthesize(&self, voice_id: &str, request: &SynthesisRequest) -> Result<AudioStream, SpeechError> {
        let url = self.synthesis_url(voice_id, request.output_format.as_deref())?;
        debug!("Synthesizing {} chars with voice {} via {}", request.text.len(), voice_id, url);

        let response = self.client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| SpeechError::Transport(format!("Synthesis request failed: {}", e)))?;

        let response = check_status(response, "Synthesis failed").await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| SpeechError::Transport(format!("Audio stream interrupted: {}", e))))
            .boxed())
    }
}

async fn check_status(response: Response, context: &str) -> Result<Response, SpeechError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let body = response.text().await.unwrap_or_default();
    let message = match provider_detail(&body) {
        Some(detail) => format!("{}: {} ({})", context, reason, detail),
        None => format!("{}: {}", context, reason),
    };

    error!("{} [{}]", message, status.as_u16());
    Err(SpeechError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pull the human-readable part out of an error body. The provider answers
/// with `{"detail": {"message": ..}}` or `{"detail": ".."}`; anything else is
/// passed through as-is.
fn provider_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let detail = json.get("detail")?;
            detail
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| detail.as_str())
                .map(str::to_string)
        });

    Some(detail.unwrap_or_else(|| body.to_string()))
}
