use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::constants::AUTO_LANGUAGE;
use crate::shared::settings::TranscriptionSettings;
use crate::transcription::domain::speech_transcriber::SpeechTranscriber;
use crate::transcription::domain::transcription_outcome::{FailureKind, TranscriptionOutcome};

#[derive(Error, Debug)]
enum OpenAiError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl OpenAiError {
    fn into_outcome(self) -> TranscriptionOutcome {
        match self {
            OpenAiError::Status { status, .. } if status == StatusCode::UNAUTHORIZED => {
                TranscriptionOutcome::failed(
                    FailureKind::CredentialsInvalid,
                    "Please check your OpenAI API key",
                )
            }
            OpenAiError::Read { .. } => {
                TranscriptionOutcome::failed(FailureKind::FileNotFound, self.to_string())
            }
            other => TranscriptionOutcome::failed(FailureKind::ProviderError, other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    language: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    avg_logprob: Option<f64>,
}

/// Speech-to-text through the OpenAI audio transcription endpoint.
///
/// Requests `verbose_json` so that per-segment log-probabilities come back
/// alongside the text. Credentials and file existence are checked by the
/// caller before this is reached.
pub struct OpenAiTranscriber {
    client: reqwest::blocking::Client,
    timeout: Option<Duration>,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
}

impl OpenAiTranscriber {
    pub fn new(settings: &TranscriptionSettings) -> Self {
        let language = match settings.language.trim() {
            "" => None,
            lang if lang.eq_ignore_ascii_case(AUTO_LANGUAGE) => None,
            lang => Some(lang.to_string()),
        };
        // Requests wait as long as the provider takes.
        let timeout: Option<Duration> = None;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client, using defaults: {e}");
                reqwest::blocking::Client::new()
            });
        Self {
            client,
            timeout,
            api_key: settings.api_key.trim().to_string(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            language,
        }
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn request(&self, path: &Path) -> Result<TranscriptionOutcome, OpenAiError> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let bytes = fs::read(path).map_err(|e| OpenAiError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let file_part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;
        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);
        if let Some(lang) = &self.language {
            form = form.text("language", lang.clone());
        }

        log::debug!("Sending {} to {} (model={})", path.display(), url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(OpenAiError::Status { status, body });
        }

        parse_verbose_response(&body)
    }
}

impl SpeechTranscriber for OpenAiTranscriber {
    fn transcribe(&self, path: &Path) -> TranscriptionOutcome {
        match self.request(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("OpenAI transcription of {} failed: {e}", path.display());
                e.into_outcome()
            }
        }
    }
}

fn parse_verbose_response(body: &str) -> Result<TranscriptionOutcome, OpenAiError> {
    let parsed: VerboseTranscription = serde_json::from_str(body)?;
    let log_probs: Vec<f64> = parsed
        .segments
        .iter()
        .filter_map(|s| s.avg_logprob)
        .collect();

    Ok(TranscriptionOutcome::Transcribed {
        text: parsed.text.trim().to_string(),
        confidence: approximate_confidence(&log_probs),
        language: parsed.language,
    })
}

/// `exp(mean(avg_logprob))` over segments.
///
/// A rough heuristic, not a calibrated probability. `None` when there are
/// no segments to average.
pub fn approximate_confidence(avg_log_probs: &[f64]) -> Option<f64> {
    if avg_log_probs.is_empty() {
        return None;
    }
    let mean = avg_log_probs.iter().sum::<f64>() / avg_log_probs.len() as f64;
    Some(mean.exp().clamp(0.0, 1.0))
}
