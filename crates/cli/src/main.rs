use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use gothic_audio_core::audio::domain::playback_controller::PlaybackController;
use gothic_audio_core::audio::domain::player::PlaybackRequest;
use gothic_audio_core::audio::infrastructure::audio_resolver::AudioResolver;
use gothic_audio_core::audio::infrastructure::system_player_launcher::SystemPlayerLauncher;
use gothic_audio_core::dialogue::domain::character_fixup::fix_silesian;
use gothic_audio_core::dialogue::domain::dialogue_extractor::DialogueExtractor;
use gothic_audio_core::pipeline::verification_reporter::TextReportWriter;
use gothic_audio_core::pipeline::verify_dialogues_use_case::VerifyDialoguesUseCase;
use gothic_audio_core::shared::settings::{PlaybackMode, Settings};
use gothic_audio_core::transcription::domain::speech_transcriber::{
    transcribe_batch, BatchProgressFn,
};
use gothic_audio_core::transcription::domain::transcription_outcome::TranscriptionOutcome;
use gothic_audio_core::transcription::infrastructure::transcription_client::TranscriptionClient;

/// Play and verify dialogue audio referenced from Gothic scripts.
#[derive(Parser)]
#[command(name = "gothic-audio")]
struct Cli {
    /// Settings file (default: <config dir>/GothicAudio/settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding <identifier>.wav files.
    #[arg(long, global = true)]
    audio_dir: Option<String>,

    /// Workspace searched when the audio directory has no match.
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every dialogue reference in a script.
    List {
        /// Script file.
        file: PathBuf,
    },

    /// Play the audio for one dialogue line.
    Play {
        /// Script file (required with --line).
        file: Option<PathBuf>,

        /// 1-based line holding an AI_Output call or SVM assignment.
        #[arg(long)]
        line: Option<usize>,

        /// Play this identifier directly.
        #[arg(long, conflicts_with = "line")]
        id: Option<String>,

        /// Playback mode: standard, ffplay, process-start.
        #[arg(long)]
        mode: Option<PlaybackMode>,

        /// Volume in percent (0-100).
        #[arg(long)]
        volume: Option<u32>,

        /// Do not print the "Playing" notice.
        #[arg(long)]
        quiet: bool,
    },

    /// Transcribe every commented dialogue line and compare it with its audio.
    Verify {
        /// Script file.
        file: PathBuf,

        /// Enable transcription for this run even if the settings disable it.
        #[arg(long)]
        enable: bool,

        #[command(flatten)]
        transcription: TranscriptionArgs,
    },

    /// Transcribe audio files one after another.
    Transcribe {
        /// Audio files.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        transcription: TranscriptionArgs,
    },

    /// Replace legacy Silesian character sequences.
    FixSilesian {
        /// Script file.
        file: PathBuf,

        /// Rewrite the file instead of printing the result.
        #[arg(long, conflicts_with = "output")]
        in_place: bool,

        /// Write the result to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct TranscriptionArgs {
    /// Transcription API key (falls back to OPENAI_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// Spoken language code, or "auto".
    #[arg(long)]
    language: Option<String>,

    /// Minimum confidence for a match (0.0-1.0).
    #[arg(long)]
    threshold: Option<f64>,
}

impl TranscriptionArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(key) = &self.api_key {
            settings.transcription.api_key = key.clone();
        }
        if let Some(lang) = &self.language {
            settings.transcription.language = lang.clone();
        }
        if let Some(threshold) = self.threshold {
            settings.transcription.confidence_threshold = threshold;
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli)?;

    match &cli.command {
        Command::List { file } => run_list(file),
        Command::Play {
            file,
            line,
            id,
            mode,
            volume,
            quiet,
        } => {
            if let Some(mode) = mode {
                settings.playback_mode = *mode;
            }
            if let Some(volume) = volume {
                settings.volume = *volume;
            }
            if *quiet {
                settings.show_playback_notification = false;
            }
            settings.validate()?;
            let identifier = identifier_to_play(file.as_deref(), *line, id.as_deref())?;
            run_play(&settings, cli.workspace.clone(), &identifier)
        }
        Command::Verify {
            file,
            enable,
            transcription,
        } => {
            transcription.apply(&mut settings);
            if *enable {
                settings.transcription.enabled = true;
            }
            settings.validate()?;
            run_verify(&settings, cli.workspace.clone(), file)
        }
        Command::Transcribe {
            files,
            transcription,
        } => {
            transcription.apply(&mut settings);
            settings.validate()?;
            run_transcribe(&settings, files)
        }
        Command::FixSilesian {
            file,
            in_place,
            output,
        } => run_fix_silesian(file, *in_place, output.as_deref()),
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(dir) = &cli.audio_dir {
        settings.audio_dir = dir.clone();
    }
    Ok(settings.with_env_api_key())
}

fn read_script(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()).into())
}

fn run_list(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_script(file)?;
    let occurrences = DialogueExtractor::extract(&text);
    if occurrences.is_empty() {
        println!("No dialogues found in this file.");
        return Ok(());
    }
    for o in &occurrences {
        if o.is_verifiable() {
            println!("{:>5}  {}  // {}", o.display_line(), o.identifier, o.expected_text);
        } else {
            println!("{:>5}  {}", o.display_line(), o.identifier);
        }
    }
    Ok(())
}

fn identifier_to_play(
    file: Option<&Path>,
    line: Option<usize>,
    id: Option<&str>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(id) = id {
        return Ok(id.to_string());
    }
    let (Some(file), Some(line)) = (file, line) else {
        return Err("Pass --id, or a script file with --line".into());
    };
    if line == 0 {
        return Err("Line numbers start at 1".into());
    }
    let text = read_script(file)?;
    DialogueExtractor::identifier_on_line(&text, line - 1).ok_or_else(|| {
        format!(
            "No dialogue found on line {line}. Use a line with AI_Output or an SVM assignment."
        )
        .into()
    })
}

fn run_play(
    settings: &Settings,
    workspace: Option<PathBuf>,
    identifier: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let audio_dir = settings
        .audio_dir()
        .ok_or("Gothic audio directory not configured. Set audio_dir in the settings or pass --audio-dir.")?;

    let resolver = AudioResolver::from_settings(settings, workspace);
    let path = resolver.resolve(identifier).ok_or_else(|| {
        format!("No audio found for {identifier} in {}", audio_dir.display())
    })?;

    let request = PlaybackRequest::new(&path, settings.playback_mode, settings.volume);
    if settings.show_playback_notification {
        match settings.playback_mode {
            PlaybackMode::ProcessStart => eprintln!(
                "Opening: {} (volume control not available with process-start)",
                path.display()
            ),
            _ => eprintln!("Playing: {} (Volume: {}%)", path.display(), request.volume),
        }
    }

    let mut controller = PlaybackController::new(Box::new(SystemPlayerLauncher::new()));
    controller.start_playback(&request)?;
    controller.wait()?;
    Ok(())
}

fn run_verify(
    settings: &Settings,
    workspace: Option<PathBuf>,
    file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if !settings.transcription.enabled {
        return Err(
            "Dialogue transcription is not enabled. Set transcription.enabled in the settings or pass --enable."
                .into(),
        );
    }
    if settings.audio_dir().is_none() {
        return Err(
            "Gothic audio directory not configured. Set audio_dir in the settings or pass --audio-dir."
                .into(),
        );
    }
    let client = TranscriptionClient::new(&settings.transcription);
    if !client.is_configured() {
        return Err(
            "Transcription API key not configured. Set transcription.api_key in the settings or OPENAI_API_KEY."
                .into(),
        );
    }
    log::info!("Transcribing with provider '{}'", client.provider_name());

    let text = read_script(file)?;
    let use_case = VerifyDialoguesUseCase::new(
        Box::new(AudioResolver::from_settings(settings, workspace)),
        Box::new(client),
        settings.transcription.confidence_threshold,
    );

    let mut reporter = TextReportWriter::new(io::stdout());
    let report = use_case.run(&text, &mut reporter)?;

    if report.summary.all_matched() {
        eprintln!("✓ All {} dialogues verified successfully!", report.summary.total);
    } else {
        eprintln!(
            "Verification complete: {} matched, {} mismatched.",
            report.summary.matched, report.summary.mismatched
        );
    }
    Ok(())
}

fn run_transcribe(settings: &Settings, files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let client = TranscriptionClient::new(&settings.transcription);
    let mut report_progress = |done: usize, total: usize| eprintln!("({done}/{total})");
    let progress: BatchProgressFn<'_> = &mut report_progress;
    let results = transcribe_batch(&client, files, Some(progress));

    for (path, outcome) in results {
        match outcome {
            TranscriptionOutcome::Transcribed {
                text, confidence, ..
            } => match confidence {
                Some(c) => println!("{}: {text} ({:.1}%)", path.display(), c * 100.0),
                None => println!("{}: {text}", path.display()),
            },
            failed => println!(
                "{}: {}",
                path.display(),
                failed.error_placeholder().unwrap_or_default()
            ),
        }
    }
    Ok(())
}

fn run_fix_silesian(
    file: &Path,
    in_place: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_script(file)?;
    let result = fix_silesian(&text);

    match (in_place, output) {
        (true, _) => fs::write(file, &result.text)?,
        (false, Some(out)) => fs::write(out, &result.text)?,
        (false, None) => print!("{}", result.text),
    }

    if result.replacements > 0 {
        eprintln!("Fixed Silesian: Replaced {} occurrence(s)", result.replacements);
    } else {
        eprintln!("No characters found to replace");
    }
    Ok(())
}
