use std::io::Write;

use super::verification_record::{RecordStatus, VerificationRecord, VerificationSummary};

/// Stages one verification run passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Extracting,
    Resolving,
    Transcribing,
    Comparing,
    Summarizing,
    Done,
}

/// Observer for a verification run.
///
/// Records arrive one at a time as they complete, so long batches show
/// progress instead of appearing frozen.
pub trait VerificationReporter {
    /// Number of dialogues about to be verified.
    fn started(&mut self, total: usize);

    fn stage(&mut self, stage: VerificationStage);

    /// `(completed, total)` after each record.
    fn progress(&mut self, current: usize, total: usize);

    fn record(&mut self, record: &VerificationRecord);

    fn summary(&mut self, summary: &VerificationSummary);
}

/// Discards all events.
pub struct NullVerificationReporter;

impl VerificationReporter for NullVerificationReporter {
    fn started(&mut self, _total: usize) {}
    fn stage(&mut self, _stage: VerificationStage) {}
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn record(&mut self, _record: &VerificationRecord) {}
    fn summary(&mut self, _summary: &VerificationSummary) {}
}

/// Report lines for one record.
pub fn format_record(record: &VerificationRecord) -> Vec<String> {
    let line = record.line_number + 1;
    let mut lines = Vec::new();
    match record.status {
        RecordStatus::Matched => {
            lines.push(format!("✓ [Line {line}] {}", record.identifier));
        }
        RecordStatus::Mismatched => {
            lines.push(format!("⚠ [Line {line}] {}", record.identifier));
            lines.push(format!("   Expected:     \"{}\"", record.expected_text));
            lines.push(format!("   Transcribed:  \"{}\"", record.transcribed_text));
            if let Some(c) = record.confidence {
                lines.push(format!("   Confidence:   {:.1}%", c * 100.0));
            }
        }
        RecordStatus::Error => {
            lines.push(format!("❌ [Line {line}] {}", record.identifier));
            lines.push(format!("   {}", record.transcribed_text));
        }
    }
    lines.push(String::new());
    lines
}

pub fn format_summary(summary: &VerificationSummary) -> Vec<String> {
    vec![
        "=== Summary ===".to_string(),
        String::new(),
        format!("✓ Matched: {}", summary.matched),
        format!("⚠ Mismatched: {}", summary.mismatched),
        format!("Total: {}", summary.total),
    ]
}

/// Writes the human-readable, line-oriented report to any sink.
///
/// Write failures are logged and otherwise ignored; the run itself
/// continues.
pub struct TextReportWriter<W: Write> {
    out: W,
    last_stage: Option<VerificationStage>,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_stage: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_lines<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        for line in lines {
            if let Err(e) = writeln!(self.out, "{line}") {
                log::warn!("Failed to write report: {e}");
                return;
            }
        }
        if let Err(e) = self.out.flush() {
            log::warn!("Failed to flush report: {e}");
        }
    }
}

impl<W: Write> VerificationReporter for TextReportWriter<W> {
    fn started(&mut self, total: usize) {
        self.write_lines([
            "=== Dialogue Verification Results ===".to_string(),
            String::new(),
            format!("Total dialogues to verify: {total}"),
            String::new(),
            "=== Processing ===".to_string(),
            String::new(),
        ]);
    }

    fn stage(&mut self, stage: VerificationStage) {
        if self.last_stage != Some(stage) {
            log::debug!("Verification stage: {stage:?}");
            self.last_stage = Some(stage);
        }
    }

    fn progress(&mut self, current: usize, total: usize) {
        log::info!("Processing {current}/{total} dialogues...");
    }

    fn record(&mut self, record: &VerificationRecord) {
        self.write_lines(format_record(record));
    }

    fn summary(&mut self, summary: &VerificationSummary) {
        self.write_lines(format_summary(summary));
    }
}
