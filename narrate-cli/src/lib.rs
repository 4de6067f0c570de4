// Narrate command line support
// Shared setup for the single-file and batch binaries

use clap::error::ErrorKind;
use clap::Parser;
use narrate_spk::{
    BatchReport, ConversionOptions, ConverterDefaults, ElevenLabsClient, EnvConfig, SpeechApi, SpeechConverter,
    SpeechError, Voice, VoiceCatalog, VoiceSelection,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Second positional argument that switches `narrate` to voice listing
pub const LIST_VOICES_ARG: &str = "--list-voices";

/// Initialize logging from `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Parse arguments; usage errors exit with status 1
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

/// Everything a run needs, built once from the environment
pub struct Session {
    pub env: EnvConfig,
    pub catalog: VoiceCatalog,
    pub converter: SpeechConverter,
}

impl Session {
    /// Session talking to the configured ElevenLabs endpoint
    pub fn new(env: EnvConfig, model_id: Option<String>) -> Result<Self, SpeechError> {
        let api: Arc<dyn SpeechApi> = Arc::new(ElevenLabsClient::new(&env.api)?);
        Self::with_api(env, model_id, api)
    }

    /// Session over any [`SpeechApi`]. A model id from the command line
    /// takes precedence over `DEFAULT_MODEL_ID`.
    pub fn with_api(env: EnvConfig, model_id: Option<String>, api: Arc<dyn SpeechApi>) -> Result<Self, SpeechError> {
        let mut defaults = ConverterDefaults::default().with_options(&env.options);

        if let Some(model) = model_id {
            info!("Using model: {}", model);
            defaults = defaults.with_options(&ConversionOptions {
                model_id: Some(model),
                ..Default::default()
            });
        }

        if let Some(ref settings) = env.options.voice_settings {
            info!("Applied voice settings from env: {:?}", settings);
        }

        let converter = SpeechConverter::new(api.clone(), defaults)?;
        let catalog = VoiceCatalog::new(api);

        Ok(Self { env, catalog, converter })
    }

    /// Voice id for this run, `None` for the converter default
    pub async fn select_voice(&self, requested_name: Option<String>) -> Result<Option<String>, SpeechError> {
        VoiceSelection {
            requested_name,
            env_voice_id: self.env.default_voice_id.clone(),
            env_voice_name: self.env.default_voice_name.clone(),
        }
        .resolve(&self.catalog)
        .await
    }
}

/// One line per voice (name, id) with its description indented below
pub fn format_voices(voices: &[Voice]) -> String {
    let mut out = format!("Available voices ({}):\n", voices.len());
    for voice in voices {
        out.push_str(&format!("  {} ({})\n", voice.name, voice.voice_id));
        if let Some(description) = voice.description.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push_str(&format!("      {}\n", description.trim()));
        }
    }
    out
}

/// Batch summary line followed by one line per failed file
pub fn format_report(report: &BatchReport) -> String {
    let mut out = format!(
        "Batch processing complete! {} converted, {} skipped, {} failed\n",
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        out.push_str(&format!("✗ {}: {}\n", failure.path.display(), failure.error));
    }
    out
}
