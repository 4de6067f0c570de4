//! Error types for narrate-spk

use std::path::PathBuf;
use thiserror::Error;

/// Speech conversion errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input is empty{}", .0.as_ref().map(|p| format!(": {}", p.display())).unwrap_or_default())]
    EmptyInput(Option<PathBuf>),

    #[error("Cannot read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Cannot write output {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

