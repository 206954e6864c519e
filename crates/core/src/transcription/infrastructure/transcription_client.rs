use std::path::Path;

use crate::shared::constants::OPENAI_PROVIDER;
use crate::shared::settings::TranscriptionSettings;
use crate::transcription::domain::speech_transcriber::SpeechTranscriber;
use crate::transcription::domain::transcription_outcome::{FailureKind, TranscriptionOutcome};

use super::openai_transcriber::OpenAiTranscriber;

/// Transcription providers this client knows how to call.
pub enum TranscriptionProvider {
    OpenAi(OpenAiTranscriber),
    /// Configured name that no handler exists for.
    Unsupported(String),
}

impl TranscriptionProvider {
    pub fn from_settings(settings: &TranscriptionSettings) -> Self {
        match settings.provider.trim().to_lowercase().as_str() {
            OPENAI_PROVIDER => TranscriptionProvider::OpenAi(OpenAiTranscriber::new(settings)),
            _ => TranscriptionProvider::Unsupported(settings.provider.clone()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TranscriptionProvider::OpenAi(_) => OPENAI_PROVIDER,
            TranscriptionProvider::Unsupported(name) => name,
        }
    }
}

/// Entry point for transcribing dialogue files.
///
/// Checks credentials and file existence before dispatching to the
/// configured provider, so no request is made for a file that cannot be sent.
pub struct TranscriptionClient {
    has_credentials: bool,
    provider: TranscriptionProvider,
}

impl TranscriptionClient {
    pub fn new(settings: &TranscriptionSettings) -> Self {
        Self::with_provider(
            settings.has_credentials(),
            TranscriptionProvider::from_settings(settings),
        )
    }

    pub fn with_provider(has_credentials: bool, provider: TranscriptionProvider) -> Self {
        Self {
            has_credentials,
            provider,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.has_credentials
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl SpeechTranscriber for TranscriptionClient {
    fn transcribe(&self, path: &Path) -> TranscriptionOutcome {
        if !self.has_credentials {
            return TranscriptionOutcome::failed(
                FailureKind::NotConfigured,
                "Set transcription.api_key in the settings or OPENAI_API_KEY",
            );
        }
        if !path.is_file() {
            return TranscriptionOutcome::failed(
                FailureKind::FileNotFound,
                path.display().to_string(),
            );
        }

        match &self.provider {
            TranscriptionProvider::OpenAi(openai) => openai.transcribe(path),
            TranscriptionProvider::Unsupported(name) => {
                TranscriptionOutcome::failed(FailureKind::UnknownProvider, name.clone())
            }
        }
    }
}
