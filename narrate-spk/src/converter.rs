//! Text and text-file to speech conversion

use crate::api::{collect_audio, SpeechApi, SynthesisRequest};
use crate::config::{ConversionOptions, ConverterDefaults};
use crate::error::SpeechError;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Audio produced for one source file
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub audio: Bytes,
    pub output_path: PathBuf,
}

/// Output path beside `source`: same stem, extension swapped
/// (`notes.txt` -> `notes.mp3`, `a.b.txt` -> `a.b.mp3`).
pub fn default_output_path(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

/// Converts text to audio through a [`SpeechApi`].
///
/// Defaults are fixed at construction; per-call overrides are merged on top
/// of them for that call only.
pub struct SpeechConverter {
    api: Arc<dyn SpeechApi>,
    defaults: Arc<ConverterDefaults>,
}

impl SpeechConverter {
    /// Create a new speech converter
    pub fn new(api: Arc<dyn SpeechApi>, defaults: ConverterDefaults) -> Result<Self, SpeechError> {
        if defaults.voice_id.trim().is_empty() {
            return Err(SpeechError::Config("Default voice id cannot be empty".to_string()));
        }
        defaults.options.validate().map_err(SpeechError::Config)?;

        Ok(Self {
            api,
            defaults: Arc::new(defaults),
        })
    }

    pub fn default_voice_id(&self) -> &str {
        &self.defaults.voice_id
    }

    pub fn default_options(&self) -> &ConversionOptions {
        &self.defaults.options
    }

    /// Defaults with `overrides` applied
    pub fn effective_options(&self, overrides: Option<&ConversionOptions>) -> ConversionOptions {
        match overrides {
            Some(overrides) => self.defaults.options.merge(overrides),
            None => self.defaults.options.clone(),
        }
    }

    /// Where `convert_file` writes when no output path is given
    pub fn output_path_for(&self, source: &Path, overrides: Option<&ConversionOptions>) -> PathBuf {
        default_output_path(source, self.effective_options(overrides).audio_extension())
    }

    /// Synthesize `text` and return the complete audio buffer
    pub async fn convert_text(
        &self,
        text: &str,
        voice_id: Option<&str>,
        overrides: Option<&ConversionOptions>,
    ) -> Result<Bytes, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput(None));
        }

        let voice_id = voice_id.unwrap_or(self.defaults.voice_id.as_str());
        let options = self.effective_options(overrides);
        options.validate().map_err(SpeechError::Config)?;

        let request = SynthesisRequest {
            text: text.to_string(),
            model_id: options.model_id,
            language_code: options.language_code,
            voice_settings: options.voice_settings.filter(|s| !s.is_empty()),
            apply_text_normalization: options.apply_text_normalization,
            output_format: options.output_format,
        };

        debug!(
            "Converting {} chars with voice {} (model {})",
            text.len(),
            voice_id,
            request.model_id.as_deref().unwrap_or("provider default")
        );

        let stream = self.api.synthesize(voice_id, &request).await?;
        collect_audio(stream).await
    }

    /// Convert a UTF-8 text file and write the audio beside it (or to
    /// `output_path`). Returns the path written.
    pub async fn convert_file(
        &self,
        path: &Path,
        voice_id: Option<&str>,
        overrides: Option<&ConversionOptions>,
        output_path: Option<&Path>,
    ) -> Result<PathBuf, SpeechError> {
        self.convert_file_detailed(path, voice_id, overrides, output_path)
            .await
            .map(|result| result.output_path)
    }

    /// Same as [`convert_file`](Self::convert_file), also handing back the audio
    pub async fn convert_file_detailed(
        &self,
        path: &Path,
        voice_id: Option<&str>,
        overrides: Option<&ConversionOptions>,
        output_path: Option<&Path>,
    ) -> Result<ConversionResult, SpeechError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SpeechError::Input {
                path: path.to_path_buf(),
                source,
            })?;

        if text.trim().is_empty() {
            return Err(SpeechError::EmptyInput(Some(path.to_path_buf())));
        }

        info!("Converting text to speech: {}", path.display());

        let audio = self.convert_text(&text, voice_id, overrides).await?;

        let output_path = match output_path {
            Some(explicit) => explicit.to_path_buf(),
            None => self.output_path_for(path, overrides),
        };

        tokio::fs::write(&output_path, &audio)
            .await
            .map_err(|source| SpeechError::Write {
                path: output_path.clone(),
                source,
            })?;

        info!("Audio saved to: {} ({} bytes)", output_path.display(), audio.len());
        Ok(ConversionResult { audio, output_path })
    }
}
