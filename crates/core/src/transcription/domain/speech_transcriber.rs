use std::path::{Path, PathBuf};

use super::transcription_outcome::TranscriptionOutcome;

/// Domain interface for turning one audio file into text.
///
/// Implementations report every failure as a [`TranscriptionOutcome::Failed`]
/// value and never retry.
pub trait SpeechTranscriber {
    fn transcribe(&self, path: &Path) -> TranscriptionOutcome;
}

/// Progress callback: `(completed, total)`.
pub type BatchProgressFn<'a> = &'a mut dyn FnMut(usize, usize);

/// Transcribes `paths` strictly one after another, in input order.
///
/// `progress` is called once after each file completes.
pub fn transcribe_batch(
    transcriber: &dyn SpeechTranscriber,
    paths: &[PathBuf],
    mut progress: Option<BatchProgressFn<'_>>,
) -> Vec<(PathBuf, TranscriptionOutcome)> {
    let total = paths.len();
    let mut results = Vec::with_capacity(total);

    for (i, path) in paths.iter().enumerate() {
        let outcome = transcriber.transcribe(path);
        results.push((path.clone(), outcome));
        if let Some(cb) = progress.as_mut() {
            cb(i + 1, total);
        }
    }

    results
}
