//! Shared test doubles for the speech API

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use narrate_spk::api::{AudioStream, SpeechApi, SynthesisRequest};
use narrate_spk::error::SpeechError;
use narrate_spk::voice_catalog::{Voice, VoiceFilter};
use parking_lot::Mutex;
use std::sync::Arc;

type SynthesizeFn = dyn Fn(&str, &SynthesisRequest) -> Result<Vec<Bytes>, SpeechError> + Send + Sync;

/// In-memory [`SpeechApi`] that records every call
pub struct StubApi {
    voices: Vec<Voice>,
    synthesize_fn: Arc<SynthesizeFn>,
    pub listings: Mutex<Vec<VoiceFilter>>,
    pub syntheses: Mutex<Vec<(String, SynthesisRequest)>>,
}

impl StubApi {
    /// Stub whose synthesis yields `chunks` in order
    pub fn with_chunks(chunks: &'static [&'static str]) -> Self {
        Self::new(move |_voice: &str, _request: &SynthesisRequest| {
            Ok(chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect())
        })
    }

    pub fn new<F>(synthesize_fn: F) -> Self
    where
        F: Fn(&str, &SynthesisRequest) -> Result<Vec<Bytes>, SpeechError> + Send + Sync + 'static,
    {
        Self {
            voices: Vec::new(),
            synthesize_fn: Arc::new(synthesize_fn),
            listings: Mutex::new(Vec::new()),
            syntheses: Mutex::new(Vec::new()),
        }
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    pub fn synthesis_count(&self) -> usize {
        self.syntheses.lock().len()
    }

    pub fn last_request(&self) -> Option<(String, SynthesisRequest)> {
        self.syntheses.lock().last().cloned()
    }
}

#[async_trait]
impl SpeechApi for StubApi {
    async fn list_voices(&self, filter: &VoiceFilter) -> Result<Vec<Voice>, SpeechError> {
        self.listings.lock().push(filter.clone());
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, voice_id: &str, request: &SynthesisRequest) -> Result<AudioStream, SpeechError> {
        self.syntheses.lock().push((voice_id.to_string(), request.clone()));
        let chunks = (self.synthesize_fn)(voice_id, request)?;
        Ok(futures_util::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

pub fn voice(id: &str, name: &str) -> Voice {
    Voice {
        voice_id: id.to_string(),
        name: name.to_string(),
        description: None,
        category: None,
        labels: None,
        preview_url: None,
        settings: None,
    }
}
