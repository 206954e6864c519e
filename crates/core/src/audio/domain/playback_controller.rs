use super::player::{classify_exit, PlaybackError, PlaybackRequest, PlayerLauncher, PlayerProcess};
use crate::shared::settings::PlaybackMode;

/// Identity of one started playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(u64);

struct ActivePlayback {
    handle: PlaybackHandle,
    mode: PlaybackMode,
    process: Box<dyn PlayerProcess>,
}

/// Owns zero or one running player process.
///
/// Starting a new playback kills the previous process first, so two dialogue
/// lines never overlap. Exit notifications carry the handle they belong to;
/// a late exit from a replaced process leaves the current one tracked.
pub struct PlaybackController {
    launcher: Box<dyn PlayerLauncher>,
    active: Option<ActivePlayback>,
    next_id: u64,
}

impl PlaybackController {
    pub fn new(launcher: Box<dyn PlayerLauncher>) -> Self {
        Self {
            launcher,
            active: None,
            next_id: 1,
        }
    }

    pub fn start_playback(
        &mut self,
        request: &PlaybackRequest,
    ) -> Result<PlaybackHandle, PlaybackError> {
        if self.release_active() {
            log::debug!("Killed previous playback before starting {}", request.path.display());
        }

        let process = self.launcher.launch(request)?;
        let handle = PlaybackHandle(self.next_id);
        self.next_id += 1;

        log::info!(
            "Playing: {} (mode={}, volume={}%)",
            request.path.display(),
            request.mode,
            request.volume
        );
        self.active = Some(ActivePlayback {
            handle,
            mode: request.mode,
            process,
        });
        Ok(handle)
    }

    /// Kills the active process. Returns `false` when nothing was playing.
    pub fn stop(&mut self) -> bool {
        let stopped = self.release_active();
        if stopped {
            log::info!("Audio stopped");
        }
        stopped
    }

    /// Clears the slot if `handle` is still the tracked playback.
    pub fn handle_exit(&mut self, handle: PlaybackHandle) -> bool {
        match &self.active {
            Some(active) if active.handle == handle => {
                self.active = None;
                true
            }
            _ => {
                log::debug!("Ignoring exit of replaced playback {handle:?}");
                false
            }
        }
    }

    pub fn current(&self) -> Option<PlaybackHandle> {
        self.active.as_ref().map(|a| a.handle)
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Blocks until the tracked player exits, then releases it.
    pub fn wait(&mut self) -> Result<(), PlaybackError> {
        let active = self.active.as_mut().ok_or(PlaybackError::NotPlaying)?;
        let handle = active.handle;
        let mode = active.mode;
        let exit = active.process.wait().map_err(PlaybackError::Wait)?;
        self.handle_exit(handle);
        classify_exit(mode, exit)
    }

    fn release_active(&mut self) -> bool {
        match self.active.take() {
            Some(mut active) => {
                if let Err(e) = active.process.kill() {
                    log::warn!("Failed to kill player process: {e}");
                }
                true
            }
            None => false,
        }
    }
}
