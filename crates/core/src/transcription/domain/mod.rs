pub mod speech_transcriber;
pub mod transcription_outcome;
