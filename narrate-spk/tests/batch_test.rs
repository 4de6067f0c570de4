//! Tests for directory batch conversion

mod common;

use bytes::Bytes;
use common::StubApi;
use narrate_spk::batch::{text_files, BatchRunner};
use narrate_spk::config::ConverterDefaults;
use narrate_spk::converter::SpeechConverter;
use narrate_spk::error::SpeechError;
use narrate_spk::SynthesisRequest;
use std::fs;
use std::sync::Arc;

fn converter(api: Arc<StubApi>) -> SpeechConverter {
    SpeechConverter::new(api, ConverterDefaults::default()).unwrap()
}

/// Echoes the request text back as audio; fails for text containing "FAIL"
fn echo_api() -> Arc<StubApi> {
    Arc::new(StubApi::new(|_voice: &str, request: &SynthesisRequest| {
        if request.text.contains("FAIL") {
            return Err(SpeechError::Api {
                status: 422,
                message: "Synthesis failed: Unprocessable Entity".to_string(),
            });
        }
        Ok(vec![Bytes::from(format!("audio:{}", request.text))])
    }))
}

#[tokio::test]
async fn test_batch_skips_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "first").unwrap();
    fs::write(dir.path().join("b.txt"), "second").unwrap();
    fs::write(dir.path().join("b.mp3"), "existing audio").unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(report.converted, vec![dir.path().join("a.mp3")]);
    assert_eq!(report.skipped, vec![dir.path().join("b.txt")]);
    assert!(report.is_success());

    assert_eq!(fs::read(dir.path().join("a.mp3")).unwrap(), b"audio:first");
    assert_eq!(fs::read(dir.path().join("b.mp3")).unwrap(), b"existing audio");

    let calls = api.syntheses.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.text, "first");
}

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "valid").unwrap();
    fs::write(dir.path().join("bad.txt"), "FAIL here").unwrap();
    fs::write(dir.path().join("c.txt"), "also valid").unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(
        report.converted,
        vec![dir.path().join("a.mp3"), dir.path().join("c.mp3")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, dir.path().join("bad.txt"));
    assert!(matches!(report.failed[0].error, SpeechError::Api { status: 422, .. }));
    assert!(!report.is_success());
    assert_eq!(report.total(), 3);

    assert!(dir.path().join("a.mp3").exists());
    assert!(!dir.path().join("bad.mp3").exists());
    assert!(dir.path().join("c.mp3").exists());
    assert_eq!(api.synthesis_count(), 3);
}

#[tokio::test]
async fn test_batch_empty_file_is_a_failure_not_a_call() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("empty.txt"), "   \n").unwrap();
    fs::write(dir.path().join("full.txt"), "words").unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(report.converted, vec![dir.path().join("full.mp3")]);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, SpeechError::EmptyInput(_)));
    assert_eq!(api.synthesis_count(), 1);
}

#[tokio::test]
async fn test_batch_processes_in_name_order_with_voice() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["c.txt", "a.txt", "D.TXT", "b.txt"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let api = echo_api();
    let converter = converter(api.clone());
    BatchRunner::new(&converter)
        .run(dir.path(), Some("voice-x"), None)
        .await
        .unwrap();

    let calls = api.syntheses.lock();
    let texts: Vec<&str> = calls.iter().map(|(_, r)| r.text.as_str()).collect();
    assert_eq!(texts, vec!["D.TXT", "a.txt", "b.txt", "c.txt"]);
    assert!(calls.iter().all(|(voice, _)| voice == "voice-x"));
}

#[tokio::test]
async fn test_batch_ignores_other_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notes.md"), "markdown").unwrap();
    fs::write(dir.path().join("audio.mp3"), "audio").unwrap();
    fs::create_dir(dir.path().join("folder.txt")).unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(report.total(), 0);
    assert_eq!(api.synthesis_count(), 0);
}

#[tokio::test]
async fn test_text_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["z.txt", "m.txt", "a.b.txt"] {
        fs::write(dir.path().join(name), "x").unwrap();
    }

    let files = text_files(dir.path()).await.unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.b.txt", "m.txt", "z.txt"]);
}

#[tokio::test]
async fn test_batch_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let converter = converter(echo_api());
    let result = BatchRunner::new(&converter).run(&missing, None, None).await;
    assert!(matches!(result, Err(SpeechError::Input { .. })));
}

#[tokio::test]
async fn test_batch_rejects_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "x").unwrap();

    let converter = converter(echo_api());
    let result = BatchRunner::new(&converter).run(&file, None, None).await;
    assert!(matches!(result, Err(SpeechError::NotADirectory(_))));
}

#[cfg(unix)]
#[tokio::test]
async fn test_batch_follows_symlinked_text_files() {
    let sources = tempfile::tempdir().unwrap();
    let real = sources.path().join("real.txt");
    fs::write(&real, "linked words").unwrap();

    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(&real, dir.path().join("linked.txt")).unwrap();
    std::os::unix::fs::symlink(sources.path().join("gone.txt"), dir.path().join("dangling.txt")).unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(report.converted, vec![dir.path().join("linked.mp3")]);
    assert_eq!(report.total(), 1);
    assert_eq!(fs::read(dir.path().join("linked.mp3")).unwrap(), b"audio:linked words");
    assert_eq!(api.synthesis_count(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_batch_records_unreadable_output_state() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "first").unwrap();
    fs::write(dir.path().join("b.txt"), "second").unwrap();
    // Self-referencing link: stat fails with a loop error rather than "not found".
    std::os::unix::fs::symlink(dir.path().join("a.mp3"), dir.path().join("a.mp3")).unwrap();

    let api = echo_api();
    let converter = converter(api.clone());
    let report = BatchRunner::new(&converter).run(dir.path(), None, None).await.unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].path, dir.path().join("a.txt"));
    assert!(matches!(&report.failed[0].error, SpeechError::Write { path, .. } if *path == dir.path().join("a.mp3")));
    assert_eq!(report.converted, vec![dir.path().join("b.mp3")]);
    assert_eq!(api.synthesis_count(), 1);
    assert_eq!(api.last_request().unwrap().1.text, "second");
}
