/// Why a single file could not be transcribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotConfigured,
    FileNotFound,
    CredentialsInvalid,
    ProviderError,
    UnknownProvider,
}

impl FailureKind {
    pub fn reason(&self) -> &'static str {
        match self {
            FailureKind::NotConfigured => "not configured",
            FailureKind::FileNotFound => "file not found",
            FailureKind::CredentialsInvalid => "credentials invalid",
            FailureKind::ProviderError => "provider error",
            FailureKind::UnknownProvider => "unknown provider",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Result of transcribing one audio file. Failures are data, not errors,
/// so a batch can carry on with the remaining files.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutcome {
    Transcribed {
        text: String,
        /// Approximate, in `[0, 1]`; `None` when the provider gave no segments.
        confidence: Option<f64>,
        language: Option<String>,
    },
    Failed {
        kind: FailureKind,
        detail: Option<String>,
    },
}

impl TranscriptionOutcome {
    pub fn failed(kind: FailureKind, detail: impl Into<String>) -> Self {
        TranscriptionOutcome::Failed {
            kind,
            detail: Some(detail.into()),
        }
    }

    pub fn is_transcribed(&self) -> bool {
        matches!(self, TranscriptionOutcome::Transcribed { .. })
    }

    /// `[ERROR: reason - detail]`, or `None` for a successful transcription.
    pub fn error_placeholder(&self) -> Option<String> {
        match self {
            TranscriptionOutcome::Transcribed { .. } => None,
            TranscriptionOutcome::Failed { kind, detail: Some(detail) } => {
                Some(format!("[ERROR: {kind} - {detail}]"))
            }
            TranscriptionOutcome::Failed { kind, detail: None } => Some(format!("[ERROR: {kind}]")),
        }
    }
}
