/// Extension of every dialogue audio file.
pub const AUDIO_EXTENSION: &str = "wav";

/// Directory names searched when the configured audio directory misses.
pub const DEFAULT_SEARCH_DIRS: &[&str] = &["Speech", "Sounds"];

/// Max candidate files inspected by the workspace fallback search.
pub const MAX_SEARCH_RESULTS: usize = 1000;

pub const DEFAULT_VOLUME: u32 = 100;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_LANGUAGE: &str = "de";
pub const AUTO_LANGUAGE: &str = "auto";

pub const OPENAI_PROVIDER: &str = "openai";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

pub const SETTINGS_DIR_NAME: &str = "GothicAudio";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
