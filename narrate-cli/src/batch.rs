// Narrate batch mode: convert every text file in a directory
//
// Usage: narrate-batch <directory> [voice-name] [model-id]

use anyhow::bail;
use clap::Parser;
use narrate_cli::{format_report, parse_args, Session};
use narrate_spk::{BatchRunner, EnvConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "narrate-batch")]
#[command(about = "Convert every .txt file in a directory to speech, skipping files already converted", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the .txt files
    directory: PathBuf,

    /// Voice name (overrides DEFAULT_VOICE_ID / DEFAULT_VOICE_NAME)
    voice: Option<String>,

    /// Model id (overrides DEFAULT_MODEL_ID)
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    narrate_cli::init_tracing();
    let cli: Cli = parse_args();

    if !cli.directory.exists() {
        bail!("Directory does not exist: {}", cli.directory.display());
    }
    if !cli.directory.is_dir() {
        bail!("Path is not a directory: {}", cli.directory.display());
    }

    let env = EnvConfig::from_env()?;
    let session = Session::new(env, cli.model)?;
    let voice_id = session.select_voice(cli.voice).await?;

    let report = BatchRunner::new(&session.converter)
        .run(&cli.directory, voice_id.as_deref(), None)
        .await?;

    println!();
    print!("{}", format_report(&report));

    Ok(())
}
