//! narrate-spk: text files to speech through the ElevenLabs API
//!
//! Provides:
//! - Voice lookup by name against the provider's voice listing
//! - Text and text-file conversion with immutable defaults and per-call overrides
//! - Directory batch conversion that skips already-converted files

pub mod error;
pub mod config;
pub mod api;
pub mod voice_catalog;
pub mod converter;
pub mod batch;

pub use error::SpeechError;
pub use config::{ApiConfig, ConversionOptions, ConverterDefaults, EnvConfig, TextNormalization, VoiceSettings};
pub use api::{SpeechApi, SynthesisRequest, AudioStream};
pub use api::elevenlabs::ElevenLabsClient;
pub use voice_catalog::{Voice, VoiceCatalog, VoiceFilter, VoiceSelection};
pub use converter::{ConversionResult, SpeechConverter};
pub use batch::{BatchReport, BatchRunner};
