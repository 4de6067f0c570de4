//! Directory batch conversion

use crate::config::ConversionOptions;
use crate::converter::SpeechConverter;
use crate::error::SpeechError;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// A file the batch could not convert
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: SpeechError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written, in processing order
    pub converted: Vec<PathBuf>,
    /// Source files skipped because their output already existed
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }
}

/// `.txt` files directly inside `dir`, sorted by file name
pub async fn text_files(dir: &Path) -> Result<Vec<PathBuf>, SpeechError> {
    let metadata = tokio::fs::metadata(dir)
        .await
        .map_err(|source| SpeechError::Input {
            path: dir.to_path_buf(),
            source,
        })?;
    if !metadata.is_dir() {
        return Err(SpeechError::NotADirectory(dir.to_path_buf()));
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|source| SpeechError::Input {
            path: dir.to_path_buf(),
            source,
        })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_text {
            continue;
        }
        // Follows symlinks; a dangling link is not a text file.
        if tokio::fs::metadata(&path).await.map(|m| m.is_file()).unwrap_or(false) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Converts every text file in a directory, one at a time
pub struct BatchRunner<'a> {
    converter: &'a SpeechConverter,
}

impl<'a> BatchRunner<'a> {
    pub fn new(converter: &'a SpeechConverter) -> Self {
        Self { converter }
    }

    /// Convert all `.txt` files in `dir`. Files whose output already exists
    /// are skipped; a failing file is recorded and the run moves on.
    pub async fn run(
        &self,
        dir: &Path,
        voice_id: Option<&str>,
        overrides: Option<&ConversionOptions>,
    ) -> Result<BatchReport, SpeechError> {
        let files = text_files(dir).await?;
        let mut report = BatchReport::default();

        if files.is_empty() {
            info!("No text files found in {}", dir.display());
            return Ok(report);
        }

        info!("Found {} text files:", files.len());
        for file in &files {
            info!("  - {}", display_name(file));
        }

        for source in files {
            let output = self.converter.output_path_for(&source, overrides);

            // Checked per file against the filesystem, not a snapshot.
            let exists = match tokio::fs::try_exists(&output).await {
                Ok(exists) => exists,
                Err(e) => {
                    error!("Cannot check output {}: {}", display_name(&output), e);
                    report.failed.push(BatchFailure {
                        path: source,
                        error: SpeechError::Write { path: output, source: e },
                    });
                    continue;
                }
            };
            if exists {
                info!(
                    "Skipping {} - output already exists: {}",
                    display_name(&source),
                    display_name(&output)
                );
                report.skipped.push(source);
                continue;
            }

            info!("Processing: {}", display_name(&source));
            match self.converter.convert_file(&source, voice_id, overrides, Some(&output)).await {
                Ok(written) => {
                    info!("Created: {}", display_name(&written));
                    report.converted.push(written);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", display_name(&source), e);
                    report.failed.push(BatchFailure { path: source, error: e });
                }
            }
        }

        info!(
            "Batch processing complete: {} converted, {} skipped, {} failed",
            report.converted.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
