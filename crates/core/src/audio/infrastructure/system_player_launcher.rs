use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::audio::domain::player::{
    PlaybackError, PlaybackRequest, PlayerExit, PlayerLauncher, PlayerProcess,
};
use crate::shared::settings::PlaybackMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(target_os = "macos")]
        {
            Platform::MacOs
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Platform::Linux
        }
    }
}

/// Environment variable carrying the audio path into the PowerShell player.
const PATH_ENV_VAR: &str = "GOTHIC_AUDIO_FILE";

const FFMPEG_MISSING: &str = "FFmpeg is required for ffplay playback.";

/// Program, arguments and extra environment for one player invocation.
///
/// The audio path is only ever passed as a separate argument or environment
/// value, never spliced into script source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl PlayerCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            envs: Vec::new(),
        }
    }

    /// `sh -c <script> sh <path>`; the script sees the path as `$1`.
    fn shell(script: &str, path: &str) -> Self {
        Self::new("sh", &["-c", script, "sh", path])
    }

    fn with_env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

/// Builds the invocation for the `standard` and `ffplay` modes.
///
/// Shell scripts `exec` the player so the spawned PID is the player itself
/// and killing it stops the audio. Returns `None` for `process-start`, which
/// goes through the OS file association instead.
pub fn player_command(request: &PlaybackRequest, platform: Platform) -> Option<PlayerCommand> {
    let path = request.path.display().to_string();
    let percent = request.volume.to_string();

    let command = match (request.mode, platform) {
        (PlaybackMode::ProcessStart, _) => None,
        (PlaybackMode::Ffplay, Platform::Windows) => Some(PlayerCommand::new(
            "ffplay",
            &[
                "-nodisp",
                "-autoexit",
                "-loglevel",
                "error",
                "-volume",
                &percent,
                &path,
            ],
        )),
        (PlaybackMode::Ffplay, _) => Some(PlayerCommand::shell(
            &format!(
                "if command -v ffplay > /dev/null 2>&1; then \
                 exec ffplay -nodisp -autoexit -volume {percent} \"$1\" 2>/dev/null; \
                 else echo \"ERROR: {FFMPEG_MISSING}\" >&2; exit 1; fi"
            ),
            &path,
        )),
        (PlaybackMode::Standard, Platform::Windows) => Some(
            PlayerCommand::new(
                "powershell.exe",
                &[
                    "-NoProfile",
                    "-Command",
                    &format!(
                        "Add-Type -AssemblyName PresentationFramework; \
                         $player = New-Object System.Windows.Media.MediaPlayer; \
                         $player.Volume = {}; \
                         $player.Open([System.Uri]$env:{PATH_ENV_VAR}); $player.Play(); \
                         while($player.NaturalDuration.HasTimeSpan -eq $false) {{ Start-Sleep -Milliseconds 100 }}; \
                         Start-Sleep -Seconds $player.NaturalDuration.TimeSpan.TotalSeconds; $player.Close()",
                        request.volume_factor()
                    ),
                ],
            )
            .with_env(PATH_ENV_VAR, &path),
        ),
        (PlaybackMode::Standard, Platform::MacOs) => Some(PlayerCommand::new(
            "afplay",
            &[&path, "-v", &request.volume_factor().to_string()],
        )),
        (PlaybackMode::Standard, Platform::Linux) => Some(PlayerCommand::shell(
            &format!(
                "if command -v paplay > /dev/null 2>&1; then exec paplay \"$1\"; \
                 elif command -v aplay > /dev/null 2>&1; then exec aplay \"$1\"; \
                 elif command -v ffplay > /dev/null 2>&1; then \
                 exec ffplay -nodisp -autoexit -volume {percent} \"$1\" 2>/dev/null; \
                 else echo \"ERROR: No audio player found. Please install ffmpeg, pulseaudio, or alsa-utils.\" >&2; \
                 exit 1; fi"
            ),
            &path,
        )),
    };
    command
}

/// Launches players through the host OS.
pub struct SystemPlayerLauncher {
    platform: Platform,
    search_path: Option<OsString>,
}

impl SystemPlayerLauncher {
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            search_path: None,
        }
    }

    /// Overrides the `PATH` that players and their shells are looked up on.
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    fn spawn(command: &mut Command, path: &Path) -> Result<Child, PlaybackError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PlaybackError::Launch {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn open_with_association(path: &Path) -> Result<Child, PlaybackError> {
        log::info!("Volume control is not available with process-start playback");
        let mut last_error = None;
        for mut command in open::commands(path) {
            match Self::spawn(&mut command, path) {
                Ok(child) => return Ok(child),
                Err(e) => {
                    log::debug!("Opener failed: {e}");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| PlaybackError::Launch {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no file association handler available",
            ),
        }))
    }
}

impl Default for SystemPlayerLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerLauncher for SystemPlayerLauncher {
    fn launch(&self, request: &PlaybackRequest) -> Result<Box<dyn PlayerProcess>, PlaybackError> {
        let child = match player_command(request, self.platform) {
            Some(cmd) => {
                log::debug!("Launching {} {:?}", cmd.program, cmd.args);
                let mut command = cmd.to_command();
                if let Some(search_path) = &self.search_path {
                    command.env("PATH", search_path);
                }
                match Self::spawn(&mut command, &request.path) {
                    Err(PlaybackError::Launch { source, .. })
                        if request.mode == PlaybackMode::Ffplay
                            && source.kind() == std::io::ErrorKind::NotFound =>
                    {
                        return Err(PlaybackError::MissingDependency {
                            mode: request.mode,
                            message: FFMPEG_MISSING.to_string(),
                        });
                    }
                    other => other?,
                }
            }
            None => Self::open_with_association(&request.path)?,
        };
        Ok(Box::new(ChildPlayerProcess { child }))
    }
}

struct ChildPlayerProcess {
    child: Child,
}

impl PlayerProcess for ChildPlayerProcess {
    fn kill(&mut self) -> std::io::Result<()> {
        match self.child.kill() {
            Ok(()) => {
                // Reap so the killed player does not linger as a zombie.
                let _ = self.child.wait();
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn wait(&mut self) -> std::io::Result<PlayerExit> {
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            pipe.read_to_string(&mut stderr)?;
        }
        let status = self.child.wait()?;
        Ok(PlayerExit {
            success: status.success(),
            code: status.code(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(mode: PlaybackMode, volume: u32) -> PlaybackRequest {
        PlaybackRequest::new(Path::new("/speech/DIA_001.wav"), mode, volume)
    }

    #[rstest]
    #[case(Platform::Windows)]
    #[case(Platform::MacOs)]
    #[case(Platform::Linux)]
    fn test_process_start_uses_file_association(#[case] platform: Platform) {
        assert!(player_command(&request(PlaybackMode::ProcessStart, 100), platform).is_none());
    }

    #[test]
    fn test_macos_standard_uses_afplay_volume_factor() {
        let cmd = player_command(&request(PlaybackMode::Standard, 50), Platform::MacOs).unwrap();
        assert_eq!(cmd.program, "afplay");
        assert_eq!(cmd.args, vec!["/speech/DIA_001.wav", "-v", "0.5"]);
    }

    #[test]
    fn test_linux_standard_falls_back_through_players() {
        let cmd = player_command(&request(PlaybackMode::Standard, 80), Platform::Linux).unwrap();
        assert_eq!(cmd.program, "sh");
        let script = &cmd.args[1];
        let paplay = script.find("exec paplay").unwrap();
        let aplay = script.find("exec aplay").unwrap();
        let ffplay = script.find("exec ffplay -nodisp").unwrap();
        assert!(paplay < aplay && aplay < ffplay);
        assert!(script.contains("-volume 80"));
        assert!(script.contains("No audio player found"));
    }

    #[rstest]
    #[case(PlaybackMode::Standard, Platform::Linux)]
    #[case(PlaybackMode::Ffplay, Platform::Linux)]
    #[case(PlaybackMode::Ffplay, Platform::MacOs)]
    fn test_shell_scripts_take_path_as_argument(#[case] mode: PlaybackMode, #[case] platform: Platform) {
        let cmd = player_command(&request(mode, 100), platform).unwrap();
        assert_eq!(cmd.args.len(), 4);
        assert!(!cmd.args[1].contains("DIA_001"));
        assert!(cmd.args[1].contains("\"$1\""));
        assert_eq!(cmd.args[2], "sh");
        assert_eq!(cmd.args[3], "/speech/DIA_001.wav");
    }

    #[test]
    fn test_windows_standard_passes_path_through_environment() {
        let cmd = player_command(&request(PlaybackMode::Standard, 25), Platform::Windows).unwrap();
        assert_eq!(cmd.program, "powershell.exe");
        assert!(cmd.args[2].contains("$player.Volume = 0.25"));
        assert!(!cmd.args[2].contains("DIA_001"));
        assert_eq!(
            cmd.envs,
            vec![(PATH_ENV_VAR.to_string(), "/speech/DIA_001.wav".to_string())]
        );
    }

    #[test]
    fn test_windows_ffplay_runs_player_directly() {
        let cmd = player_command(&request(PlaybackMode::Ffplay, 70), Platform::Windows).unwrap();
        assert_eq!(cmd.program, "ffplay");
        assert!(cmd.args.windows(2).any(|w| w == ["-volume", "70"]));
        assert_eq!(cmd.args.last().unwrap(), "/speech/DIA_001.wav");
    }

    #[rstest]
    #[case(Platform::MacOs)]
    #[case(Platform::Linux)]
    fn test_shell_ffplay_reports_missing_ffmpeg(#[case] platform: Platform) {
        let cmd = player_command(&request(PlaybackMode::Ffplay, 70), platform).unwrap();
        assert_eq!(cmd.program, "sh");
        assert!(cmd.args[1].contains("FFmpeg is required"));
        assert!(cmd.args[1].contains("-volume 70"));
    }

    #[cfg(target_os = "linux")]
    mod process {
        use super::*;
        use crate::audio::domain::playback_controller::PlaybackController;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;
        use std::thread;
        use std::time::{Duration, Instant};
        use tempfile::TempDir;

        /// Puts an executable `paplay` with the given body first on `PATH`.
        fn launcher_with_fake_paplay(bin: &Path, body: &str) -> SystemPlayerLauncher {
            let fake = bin.join("paplay");
            fs::write(&fake, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();
            let system_path = std::env::var_os("PATH").unwrap_or_default();
            let mut dirs = vec![bin.to_path_buf()];
            dirs.extend(std::env::split_paths(&system_path));
            SystemPlayerLauncher::new().with_search_path(std::env::join_paths(dirs).unwrap())
        }

        fn wait_for_file(path: &Path) -> String {
            let deadline = Instant::now() + Duration::from_secs(5);
            loop {
                if let Ok(text) = fs::read_to_string(path) {
                    if !text.trim().is_empty() {
                        return text.trim().to_string();
                    }
                }
                assert!(Instant::now() < deadline, "{} never written", path.display());
                thread::sleep(Duration::from_millis(20));
            }
        }

        fn is_alive(pid: &str) -> bool {
            Command::new("kill")
                .args(["-0", pid])
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false)
        }

        #[test]
        fn test_stop_kills_the_player_itself() {
            let tmp = TempDir::new().unwrap();
            let pid_file = tmp.path().join("pid");
            let body = format!("echo $$ > '{}'\nexec sleep 30", pid_file.display());
            let launcher = launcher_with_fake_paplay(tmp.path(), &body);

            let mut controller = PlaybackController::new(Box::new(launcher));
            let audio = tmp.path().join("DIA_001.wav");
            controller
                .start_playback(&PlaybackRequest::new(&audio, PlaybackMode::Standard, 100))
                .unwrap();
            let pid = wait_for_file(&pid_file);
            assert!(is_alive(&pid));

            assert!(controller.stop());
            assert!(!is_alive(&pid));
        }

        #[test]
        fn test_shell_metacharacters_in_path_stay_literal() {
            let tmp = TempDir::new().unwrap();
            let marker = tmp.path().join("injected");
            let arg_file = tmp.path().join("arg");
            let body = format!("printf '%s' \"$1\" > '{}'", arg_file.display());
            let launcher = launcher_with_fake_paplay(tmp.path(), &body);

            let audio = PathBuf::from(format!("/tmp/DIA_$(touch {})`true`.wav", marker.display()));
            let mut process = launcher
                .launch(&PlaybackRequest::new(&audio, PlaybackMode::Standard, 100))
                .unwrap();
            let exit = process.wait().unwrap();

            assert!(exit.success);
            assert!(!marker.exists());
            assert_eq!(fs::read_to_string(&arg_file).unwrap(), audio.display().to_string());
        }
    }
}
