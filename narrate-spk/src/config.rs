//! Configuration for speech conversion

use crate::error::SpeechError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Public ElevenLabs API host
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Voice used when neither the caller nor the environment picks one ("Adam")
pub const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB";

/// Model used when neither the caller nor the environment picks one
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Audio file extension when no output format is configured
pub const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// Per-request voice tunables. `None` means "use the provider default"
/// and is left out of the request body entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
}

impl VoiceSettings {
    pub fn is_empty(&self) -> bool {
        self.stability.is_none()
            && self.similarity_boost.is_none()
            && self.style.is_none()
            && self.use_speaker_boost.is_none()
    }

    /// Field-by-field merge; a field set in `overrides` wins.
    pub fn merge(&self, overrides: &VoiceSettings) -> VoiceSettings {
        VoiceSettings {
            stability: overrides.stability.or(self.stability),
            similarity_boost: overrides.similarity_boost.or(self.similarity_boost),
            style: overrides.style.or(self.style),
            use_speaker_boost: overrides.use_speaker_boost.or(self.use_speaker_boost),
        }
    }

    /// Validate voice settings
    pub fn validate(&self) -> Result<(), String> {
        let ranged = [
            ("stability", self.stability),
            ("similarity_boost", self.similarity_boost),
            ("style", self.style),
        ];

        for (name, value) in ranged {
            if let Some(v) = value {
                if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                    return Err(format!("{} must be between 0.0 and 1.0 (got {})", name, v));
                }
            }
        }

        Ok(())
    }
}

/// Text normalization mode understood by the synthesis endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextNormalization {
    Auto,
    On,
    Off,
}

impl TextNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextNormalization::Auto => "auto",
            TextNormalization::On => "on",
            TextNormalization::Off => "off",
        }
    }
}

impl FromStr for TextNormalization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TextNormalization::Auto),
            "on" => Ok(TextNormalization::On),
            "off" => Ok(TextNormalization::Off),
            other => Err(format!("Unknown text normalization mode '{}' (expected auto, on or off)", other)),
        }
    }
}

impl fmt::Display for TextNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options bundle for a conversion. Used both for converter-wide defaults
/// and for per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Model identifier (e.g. "eleven_multilingual_v2")
    pub model_id: Option<String>,

    /// Language code (e.g. "en", "de")
    pub language_code: Option<String>,

    /// Voice tunables
    pub voice_settings: Option<VoiceSettings>,

    /// Provider output format (e.g. "mp3_44100_128", "pcm_16000")
    pub output_format: Option<String>,

    /// Text normalization mode
    pub apply_text_normalization: Option<TextNormalization>,
}

impl ConversionOptions {
    /// Merge `overrides` on top of `self`. Scalar fields are replaced when
    /// set; voice settings are merged per field.
    pub fn merge(&self, overrides: &ConversionOptions) -> ConversionOptions {
        let voice_settings = match (&self.voice_settings, &overrides.voice_settings) {
            (Some(base), Some(over)) => Some(base.merge(over)),
            (base, over) => over.clone().or_else(|| base.clone()),
        };

        ConversionOptions {
            model_id: overrides.model_id.clone().or_else(|| self.model_id.clone()),
            language_code: overrides.language_code.clone().or_else(|| self.language_code.clone()),
            voice_settings,
            output_format: overrides.output_format.clone().or_else(|| self.output_format.clone()),
            apply_text_normalization: overrides.apply_text_normalization.or(self.apply_text_normalization),
        }
    }

    /// File extension matching the output format: the codec prefix before
    /// the first `_` ("mp3_44100_128" -> "mp3"). Defaults to mp3.
    pub fn audio_extension(&self) -> &str {
        self.output_format
            .as_deref()
            .and_then(|format| format.split('_').next())
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_AUDIO_EXTENSION)
    }

    /// Validate options
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref model) = self.model_id {
            if model.trim().is_empty() {
                return Err("Model id cannot be empty if provided".to_string());
            }
            if model.chars().any(|c| c.is_control()) {
                return Err("Model id contains invalid characters".to_string());
            }
        }

        if let Some(ref language) = self.language_code {
            if language.is_empty() || language.len() > 32 {
                return Err("Language code must be 1-32 chars".to_string());
            }
            if !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                return Err("Language code contains invalid characters".to_string());
            }
        }

        if let Some(ref format) = self.output_format {
            if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(format!("Invalid output format '{}'", format));
            }
        }

        if let Some(ref settings) = self.voice_settings {
            settings.validate()?;
        }

        Ok(())
    }
}

/// Converter-wide defaults, built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterDefaults {
    pub voice_id: String,
    pub options: ConversionOptions,
}

impl Default for ConverterDefaults {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            options: ConversionOptions {
                model_id: Some(DEFAULT_MODEL_ID.to_string()),
                ..Default::default()
            },
        }
    }
}

impl ConverterDefaults {
    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Layer `options` over the current defaults
    pub fn with_options(mut self, options: &ConversionOptions) -> Self {
        self.options = self.options.merge(options);
        self
    }
}

/// Remote API connection settings
#[derive(Clone)]
pub struct ApiConfig {
    /// API key sent as `xi-api-key`
    pub api_key: String,

    /// Base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds; transport default when unset
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key cannot be empty".to_string());
        }

        if self.api_key.chars().any(|c| c.is_control()) {
            return Err("API key contains invalid characters".to_string());
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid API base URL '{}': {}", self.base_url, e))?;

        let local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"));
        match url.scheme() {
            "https" => {}
            "http" if local => {}
            _ => return Err("API base URL must use HTTPS".to_string()),
        }

        if let Some(timeout) = self.timeout_secs {
            if timeout == 0 {
                return Err("API timeout must be greater than 0".to_string());
            }
            if timeout > 300 {
                return Err("API timeout too large (max 300 seconds)".to_string());
            }
        }

        Ok(())
    }
}

/// Everything the binaries read from the process environment
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub api: ApiConfig,
    pub default_voice_id: Option<String>,
    pub default_voice_name: Option<String>,
    pub options: ConversionOptions,
}

impl EnvConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self, SpeechError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SpeechError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("ELEVENLABS_API_KEY").ok_or_else(|| {
            SpeechError::Config("ELEVENLABS_API_KEY not found in environment variables".to_string())
        })?;

        let mut api = ApiConfig::new(api_key);
        if let Some(base_url) = get("ELEVENLABS_BASE_URL") {
            api = api.with_base_url(base_url);
        }
        if let Some(timeout) = get("ELEVENLABS_TIMEOUT_SECS") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                SpeechError::Config(format!("ELEVENLABS_TIMEOUT_SECS is not a number: {}", e))
            })?;
            api.timeout_secs = Some(secs);
        }
        api.validate().map_err(SpeechError::Config)?;

        let voice_settings = VoiceSettings {
            stability: parse_float(&get, "DEFAULT_STABILITY")?,
            similarity_boost: parse_float(&get, "DEFAULT_SIMILARITY_BOOST")?,
            style: parse_float(&get, "DEFAULT_STYLE")?,
            use_speaker_boost: get("DEFAULT_USE_SPEAKER_BOOST").map(|v| v == "true"),
        };

        let apply_text_normalization = get("DEFAULT_TEXT_NORMALIZATION")
            .map(|v| v.parse::<TextNormalization>())
            .transpose()
            .map_err(SpeechError::Config)?;

        let options = ConversionOptions {
            model_id: get("DEFAULT_MODEL_ID"),
            language_code: get("DEFAULT_LANGUAGE_CODE"),
            voice_settings: (!voice_settings.is_empty()).then_some(voice_settings),
            output_format: get("DEFAULT_OUTPUT_FORMAT"),
            apply_text_normalization,
        };
        options.validate().map_err(SpeechError::Config)?;

        Ok(Self {
            api,
            default_voice_id: get("DEFAULT_VOICE_ID"),
            default_voice_name: get("DEFAULT_VOICE_NAME"),
            options,
        })
    }
}

fn parse_float<G>(get: &G, key: &str) -> Result<Option<f32>, SpeechError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|v| {
            v.parse::<f32>()
                .map_err(|e| SpeechError::Config(format!("{} is not a number ('{}'): {}", key, v, e)))
        })
        .transpose()
}
