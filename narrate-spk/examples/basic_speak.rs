//! Basic text-to-speech example
//!
//! Needs ELEVENLABS_API_KEY in the environment or a `.env` file.

use narrate_spk::{ConverterDefaults, ElevenLabsClient, EnvConfig, SpeechConverter};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let env = EnvConfig::from_env()?;
    let api = Arc::new(ElevenLabsClient::new(&env.api)?);
    let converter = SpeechConverter::new(api, ConverterDefaults::default().with_options(&env.options))?;

    println!("Synthesizing speech...");
    let text = "Hello! This sentence was read aloud by a synthetic voice.";

    match converter.convert_text(text, env.default_voice_id.as_deref(), None).await {
        Ok(audio) => {
            let path = format!("basic_speak.{}", converter.default_options().audio_extension());
            tokio::fs::write(&path, &audio).await?;
            println!("Wrote {} bytes of audio to {}", audio.len(), path);
        }
        Err(e) => {
            eprintln!("Failed to synthesize speech: {}", e);
        }
    }

    Ok(())
}
