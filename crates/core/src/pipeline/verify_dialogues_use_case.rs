use thiserror::Error;

use crate::audio::domain::audio_locator::AudioLocator;
use crate::dialogue::domain::dialogue_extractor::DialogueExtractor;
use crate::transcription::domain::speech_transcriber::SpeechTranscriber;

use super::verification_record::{VerificationRecord, VerificationSummary};
use super::verification_reporter::{VerificationReporter, VerificationStage};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No dialogues found in this file.")]
    NothingToVerify,
}

/// All records of one run, in extraction order, plus their summary.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    pub records: Vec<VerificationRecord>,
    pub summary: VerificationSummary,
}

/// Checks every commented dialogue line in a script against its audio.
///
/// Per-line problems (missing audio, failed transcription) become
/// mismatched records; only an empty script aborts the run. Files are
/// transcribed one at a time.
pub struct VerifyDialoguesUseCase {
    locator: Box<dyn AudioLocator>,
    transcriber: Box<dyn SpeechTranscriber>,
    confidence_threshold: f64,
}

impl VerifyDialoguesUseCase {
    pub fn new(
        locator: Box<dyn AudioLocator>,
        transcriber: Box<dyn SpeechTranscriber>,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            locator,
            transcriber,
            confidence_threshold,
        }
    }

    pub fn run(
        &self,
        buffer: &str,
        reporter: &mut dyn VerificationReporter,
    ) -> Result<VerificationReport, VerificationError> {
        reporter.stage(VerificationStage::Extracting);
        let occurrences: Vec<_> = DialogueExtractor::extract(buffer)
            .into_iter()
            .filter(|o| o.is_verifiable())
            .collect();
        if occurrences.is_empty() {
            return Err(VerificationError::NothingToVerify);
        }

        let total = occurrences.len();
        log::info!("Verifying {total} dialogue lines");
        reporter.started(total);

        let mut records = Vec::with_capacity(total);
        for (i, occurrence) in occurrences.iter().enumerate() {
            reporter.stage(VerificationStage::Resolving);
            let record = match self.locator.locate(&occurrence.identifier) {
                None => {
                    log::warn!("No audio found for {}", occurrence.identifier);
                    VerificationRecord::unresolved(occurrence)
                }
                Some(path) => {
                    reporter.stage(VerificationStage::Transcribing);
                    let outcome = self.transcriber.transcribe(&path);
                    reporter.stage(VerificationStage::Comparing);
                    VerificationRecord::from_outcome(
                        occurrence,
                        path,
                        &outcome,
                        self.confidence_threshold,
                    )
                }
            };
            reporter.record(&record);
            reporter.progress(i + 1, total);
            records.push(record);
        }

        reporter.stage(VerificationStage::Summarizing);
        let summary = VerificationSummary::from_records(&records);
        reporter.summary(&summary);
        reporter.stage(VerificationStage::Done);

        Ok(VerificationReport { records, summary })
    }
}
