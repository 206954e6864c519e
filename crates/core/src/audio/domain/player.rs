use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::settings::PlaybackMode;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("failed to start player for {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{message} Change the playback mode (currently '{mode}') or install the missing player.")]
    MissingDependency { mode: PlaybackMode, message: String },
    #[error("player exited with status {code:?}: {stderr}")]
    PlayerFailed { code: Option<i32>, stderr: String },
    #[error("failed to wait for player: {0}")]
    Wait(#[source] std::io::Error),
    #[error("no audio is currently playing")]
    NotPlaying,
}

/// What to play and how loud.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub path: PathBuf,
    pub mode: PlaybackMode,
    /// Percent, 0-100.
    pub volume: u32,
}

impl PlaybackRequest {
    pub fn new(path: &Path, mode: PlaybackMode, volume: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            volume: volume.min(100),
        }
    }

    /// Volume as a 0.0-1.0 factor.
    pub fn volume_factor(&self) -> f64 {
        self.volume as f64 / 100.0
    }
}

/// How a player process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerExit {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

/// A running external player.
pub trait PlayerProcess: Send {
    /// Forcefully terminate. Killing an already exited process is not an error.
    fn kill(&mut self) -> std::io::Result<()>;

    /// Block until the process exits.
    fn wait(&mut self) -> std::io::Result<PlayerExit>;
}

/// Starts external players for a request.
pub trait PlayerLauncher: Send {
    fn launch(&self, request: &PlaybackRequest) -> Result<Box<dyn PlayerProcess>, PlaybackError>;
}

const MISSING_DEPENDENCY_MARKERS: &[&str] = &["FFmpeg is required", "No audio player found"];

/// Maps a finished player to a playback result, treating known stderr
/// messages as a missing external dependency.
pub fn classify_exit(mode: PlaybackMode, exit: PlayerExit) -> Result<(), PlaybackError> {
    if let Some(marker) = MISSING_DEPENDENCY_MARKERS
        .iter()
        .find(|m| exit.stderr.contains(*m))
    {
        let message = match *marker {
            "FFmpeg is required" => {
                "FFplay requires FFmpeg to be installed (https://ffmpeg.org/download.html)."
            }
            _ => "No audio player found. Install ffmpeg, pulseaudio or alsa-utils.",
        };
        return Err(PlaybackError::MissingDependency {
            mode,
            message: message.to_string(),
        });
    }
    if !exit.success {
        return Err(PlaybackError::PlayerFailed {
            code: exit.code,
            stderr: exit.stderr.trim().to_string(),
        });
    }
    Ok(())
}
