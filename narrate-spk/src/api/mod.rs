//! Remote text-to-speech API

pub mod elevenlabs;

use crate::config::{TextNormalization, VoiceSettings};
use crate::error::SpeechError;
use crate::voice_catalog::{Voice, VoiceFilter};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Serialize;
use tracing::debug;

/// Audio returned by the synthesis endpoint: finite, not restartable.
pub type AudioStream = BoxStream<'static, Result<Bytes, SpeechError>>;

/// Body of a synthesis call. Unset fields are not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_settings: Option<VoiceSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_text_normalization: Option<TextNormalization>,

    /// Sent as a query parameter, not in the body
    #[serde(skip)]
    pub output_format: Option<String>,
}

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// List voices matching `filter`, in provider order
    async fn list_voices(&self, filter: &VoiceFilter) -> Result<Vec<Voice>, SpeechError>;

    /// Start synthesis of `request` with the given voice
    async fn synthesize(&self, voice_id: &str, request: &SynthesisRequest) -> Result<AudioStream, SpeechError>;
}

/// Drain an audio stream into a single buffer, preserving chunk order.
pub async fn collect_audio(mut stream: AudioStream) -> Result<Bytes, SpeechError> {
    let mut buffer = BytesMut::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);
        chunks += 1;
    }

    debug!("Collected {} audio chunks ({} bytes)", chunks, buffer.len());
    Ok(buffer.freeze())
}
