//! Voice listing and name resolution

use crate::api::SpeechApi;
use crate::config::VoiceSettings;
use crate::error::SpeechError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A provider-hosted voice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// "premade", "cloned", "generated", "professional", ...
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub preview_url: Option<String>,

    /// Voice's own default settings, if the provider reports them
    #[serde(default)]
    pub settings: Option<VoiceSettings>,
}

/// Listing filter; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceFilter {
    pub name_contains: Option<String>,
    pub category: Option<String>,
}

impl VoiceFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            name_contains: Some(term.into()),
            category: None,
        }
    }
}

/// First voice whose name equals `name`, ignoring case
pub fn match_exact_name<'a>(voices: &'a [Voice], name: &str) -> Option<&'a Voice> {
    let wanted = name.to_lowercase();
    voices.iter().find(|voice| voice.name.to_lowercase() == wanted)
}

/// Resolves voice names against the provider's listing. Nothing is cached:
/// every lookup is a fresh listing call.
pub struct VoiceCatalog {
    api: Arc<dyn SpeechApi>,
}

impl VoiceCatalog {
    pub fn new(api: Arc<dyn SpeechApi>) -> Self {
        Self { api }
    }

    pub async fn list_voices(&self, filter: &VoiceFilter) -> Result<Vec<Voice>, SpeechError> {
        self.api.list_voices(filter).await
    }

    /// Look up a voice by exact (case-insensitive) display name
    pub async fn find_by_exact_name(&self, name: &str) -> Result<Option<Voice>, SpeechError> {
        let voices = self.api.list_voices(&VoiceFilter::search(name)).await?;
        debug!("Search for '{}' returned {} candidates", name, voices.len());
        Ok(match_exact_name(&voices, name).cloned())
    }

    /// Id of the voice named `name`, or `None` if no voice has that name
    pub async fn resolve_voice_id(&self, name: &str) -> Result<Option<String>, SpeechError> {
        info!("Looking for voice: {}", name);
        match self.find_by_exact_name(name).await? {
            Some(voice) => {
                info!("Found voice: {} ({})", voice.name, voice.voice_id);
                Ok(Some(voice.voice_id))
            }
            None => {
                warn!("Voice \"{}\" not found", name);
                Ok(None)
            }
        }
    }
}

/// Where the voice for a run comes from: an explicit name from the command
/// line, or the environment's default id/name.
#[derive(Debug, Clone, Default)]
pub struct VoiceSelection {
    pub requested_name: Option<String>,
    pub env_voice_id: Option<String>,
    pub env_voice_name: Option<String>,
}

impl VoiceSelection {
    /// Pick a voice id. `Ok(None)` means "use the converter's default voice".
    ///
    /// An id from the environment is used as-is unless a name was requested
    /// explicitly. A name that matches no voice falls back to the default
    /// with a warning; a failing listing call is an error.
    pub async fn resolve(&self, catalog: &VoiceCatalog) -> Result<Option<String>, SpeechError> {
        if self.requested_name.is_none() {
            if let Some(ref id) = self.env_voice_id {
                info!("Using voice ID from env: {}", id);
                return Ok(Some(id.clone()));
            }
        }

        let Some(name) = self.requested_name.as_ref().or(self.env_voice_name.as_ref()) else {
            return Ok(None);
        };

        let id = catalog.resolve_voice_id(name).await?;
        if id.is_none() {
            info!("Using default voice");
        }
        Ok(id)
    }
}
