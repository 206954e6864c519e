use std::path::PathBuf;

use crate::dialogue::domain::dialogue_occurrence::DialogueOccurrence;
use crate::dialogue::domain::text_comparison::compare_texts;
use crate::transcription::domain::transcription_outcome::TranscriptionOutcome;

/// How a record is presented in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Matched,
    /// Transcribed, but the text differs or confidence is below threshold.
    Mismatched,
    /// No audio file, or transcription failed.
    Error,
}

/// Outcome of checking one dialogue line against its audio.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRecord {
    pub identifier: String,
    pub line_number: usize,
    pub expected_text: String,
    /// Transcript, or an `[ERROR: ...]` placeholder.
    pub transcribed_text: String,
    pub confidence: Option<f64>,
    pub matched: bool,
    pub status: RecordStatus,
    /// Empty when the audio file could not be resolved.
    pub audio_path: PathBuf,
}

/// Text must match after normalisation, and a present confidence must reach
/// the threshold. A missing confidence never fails the check on its own.
pub fn is_match(expected: &str, transcribed: &str, confidence: Option<f64>, threshold: f64) -> bool {
    let below_threshold = confidence.is_some_and(|c| c < threshold);
    compare_texts(expected, transcribed) && !below_threshold
}

impl VerificationRecord {
    pub fn unresolved(occurrence: &DialogueOccurrence) -> Self {
        Self {
            identifier: occurrence.identifier.clone(),
            line_number: occurrence.line_number,
            expected_text: occurrence.expected_text.clone(),
            transcribed_text: format!(
                "[ERROR: audio not found - no file for {}]",
                occurrence.identifier
            ),
            confidence: None,
            matched: false,
            status: RecordStatus::Error,
            audio_path: PathBuf::new(),
        }
    }

    pub fn from_outcome(
        occurrence: &DialogueOccurrence,
        audio_path: PathBuf,
        outcome: &TranscriptionOutcome,
        threshold: f64,
    ) -> Self {
        let (transcribed_text, confidence, matched, status) = match outcome {
            TranscriptionOutcome::Transcribed {
                text, confidence, ..
            } => {
                let matched = is_match(&occurrence.expected_text, text, *confidence, threshold);
                let status = if matched {
                    RecordStatus::Matched
                } else {
                    RecordStatus::Mismatched
                };
                (text.clone(), *confidence, matched, status)
            }
            TranscriptionOutcome::Failed { .. } => (
                outcome.error_placeholder().unwrap_or_default(),
                None,
                false,
                RecordStatus::Error,
            ),
        };

        Self {
            identifier: occurrence.identifier.clone(),
            line_number: occurrence.line_number,
            expected_text: occurrence.expected_text.clone(),
            transcribed_text,
            confidence,
            matched,
            status,
            audio_path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationSummary {
    pub matched: usize,
    pub mismatched: usize,
    pub total: usize,
}

impl VerificationSummary {
    pub fn from_records(records: &[VerificationRecord]) -> Self {
        let total = records.len();
        let mismatched = records.iter().filter(|r| !r.matched).count();
        Self {
            matched: total - mismatched,
            mismatched,
            total,
        }
    }

    pub fn all_matched(&self) -> bool {
        self.mismatched == 0
    }
}
