// Narrate: convert one text file to speech
//
// Usage: narrate <path-to-text-file> [voice-name|--list-voices] [model-id]

use anyhow::Context;
use clap::Parser;
use narrate_cli::{format_voices, parse_args, Session, LIST_VOICES_ARG};
use narrate_spk::{EnvConfig, VoiceFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "narrate")]
#[command(about = "Convert a text file to speech with ElevenLabs", long_about = None)]
#[command(version)]
struct Cli {
    /// Text file to convert
    file: PathBuf,

    /// Voice name, or --list-voices to print the available voices
    #[arg(allow_hyphen_values = true)]
    voice: Option<String>,

    /// Model id (overrides DEFAULT_MODEL_ID)
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    narrate_cli::init_tracing();
    let cli: Cli = parse_args();

    let env = EnvConfig::from_env()?;
    let session = Session::new(env, cli.model)?;

    if cli.voice.as_deref() == Some(LIST_VOICES_ARG) {
        let voices = session.catalog.list_voices(&VoiceFilter::default()).await?;
        print!("{}", format_voices(&voices));
        return Ok(());
    }

    let voice_id = session.select_voice(cli.voice).await?;
    let output = session
        .converter
        .convert_file(&cli.file, voice_id.as_deref(), None, None)
        .await
        .with_context(|| format!("Error during text-to-speech conversion of {}", cli.file.display()))?;

    println!("✓ Audio saved to: {}", output.display());
    Ok(())
}
