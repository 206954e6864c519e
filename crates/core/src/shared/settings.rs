use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    API_KEY_ENV_VAR, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LANGUAGE, DEFAULT_SEARCH_DIRS,
    DEFAULT_VOLUME, OPENAI_BASE_URL, OPENAI_PROVIDER, OPENAI_TRANSCRIPTION_MODEL,
    SETTINGS_DIR_NAME, SETTINGS_FILE_NAME,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("volume must be between 0 and 100, got {0}")]
    Volume(u32),
    #[error("confidence threshold must be between 0.0 and 1.0, got {0}")]
    Threshold(f64),
}

/// How a dialogue file is handed to the operating system for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackMode {
    /// Built-in platform player with volume control.
    Standard,
    /// `ffplay` from FFmpeg; fails when FFmpeg is not installed.
    Ffplay,
    /// Whatever application the OS associates with `.wav` files.
    ProcessStart,
}

impl PlaybackMode {
    pub const ALL: &[PlaybackMode] = &[
        PlaybackMode::Standard,
        PlaybackMode::Ffplay,
        PlaybackMode::ProcessStart,
    ];
}

impl std::fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackMode::Standard => write!(f, "standard"),
            PlaybackMode::Ffplay => write!(f, "ffplay"),
            PlaybackMode::ProcessStart => write!(f, "process-start"),
        }
    }
}

impl std::str::FromStr for PlaybackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlaybackMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.to_string() == s)
            .ok_or_else(|| {
                format!("playback mode must be one of: standard, ffplay, process-start, got '{s}'")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub enabled: bool,
    pub provider: String,
    pub api_key: String,
    /// Target language code, or `"auto"` to let the provider detect it.
    pub language: String,
    pub confidence_threshold: f64,
    pub base_url: String,
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: OPENAI_PROVIDER.to_string(),
            api_key: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            base_url: OPENAI_BASE_URL.to_string(),
            model: OPENAI_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

impl TranscriptionSettings {
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio_dir: String,
    pub search_dirs: Vec<String>,
    pub volume: u32,
    pub playback_mode: PlaybackMode,
    pub show_playback_notification: bool,
    pub transcription: TranscriptionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_dir: String::new(),
            search_dirs: DEFAULT_SEARCH_DIRS.iter().map(|d| d.to_string()).collect(),
            volume: DEFAULT_VOLUME,
            playback_mode: PlaybackMode::Standard,
            show_playback_notification: true,
            transcription: TranscriptionSettings::default(),
        }
    }
}

impl Settings {
    /// `<config dir>/GothicAudio/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(SETTINGS_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Loads settings from `path`, falling back to defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads from the platform config directory, or defaults if there is none.
    pub fn load() -> Result<Self, SettingsError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Fills an empty API key from `OPENAI_API_KEY`.
    pub fn with_env_api_key(mut self) -> Self {
        if !self.transcription.has_credentials() {
            if let Ok(key) = std::env::var(API_KEY_ENV_VAR) {
                self.transcription.api_key = key;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.volume > 100 {
            return Err(SettingsError::Volume(self.volume));
        }
        let threshold = self.transcription.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SettingsError::Threshold(threshold));
        }
        Ok(())
    }

    /// The configured audio directory, or `None` when left blank.
    pub fn audio_dir(&self) -> Option<PathBuf> {
        let trimmed = self.audio_dir.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.volume, 100);
        assert_eq!(s.playback_mode, PlaybackMode::Standard);
        assert!(s.show_playback_notification);
        assert_eq!(s.search_dirs, vec!["Speech", "Sounds"]);
        assert!(!s.transcription.enabled);
        assert_eq!(s.transcription.provider, "openai");
        assert_eq!(s.transcription.language, "de");
        assert_eq!(s.transcription.confidence_threshold, 0.8);
        assert!(s.audio_dir().is_none());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let s = Settings::load_from(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(
            &path,
            r#"{"audio_dir": "/gothic/Speech", "playback_mode": "process-start",
                "transcription": {"enabled": true, "api_key": "sk-test"}}"#,
        )
        .unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.audio_dir(), Some(PathBuf::from("/gothic/Speech")));
        assert_eq!(s.playback_mode, PlaybackMode::ProcessStart);
        assert!(s.transcription.enabled);
        assert!(s.transcription.has_credentials());
        assert_eq!(s.transcription.model, "whisper-1");
        assert_eq!(s.volume, 100);
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn test_blank_api_key_is_not_credentials() {
        let mut t = TranscriptionSettings::default();
        t.api_key = "   ".to_string();
        assert!(!t.has_credentials());
    }

    #[rstest]
    #[case::volume_too_high(101, 0.8)]
    #[case::threshold_negative(100, -0.1)]
    #[case::threshold_above_one(100, 1.5)]
    fn test_validate_rejects_out_of_range(#[case] volume: u32, #[case] threshold: f64) {
        let mut s = Settings::default();
        s.volume = volume;
        s.transcription.confidence_threshold = threshold;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Settings::default().validate().is_ok());
    }

    #[rstest]
    #[case("standard", PlaybackMode::Standard)]
    #[case("ffplay", PlaybackMode::Ffplay)]
    #[case("process-start", PlaybackMode::ProcessStart)]
    fn test_playback_mode_from_str(#[case] input: &str, #[case] expected: PlaybackMode) {
        assert_eq!(input.parse::<PlaybackMode>().unwrap(), expected);
    }

    #[test]
    fn test_playback_mode_from_str_rejects_unknown() {
        assert!("vlc".parse::<PlaybackMode>().is_err());
    }
}
