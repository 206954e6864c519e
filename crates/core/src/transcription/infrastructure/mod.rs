pub mod openai_transcriber;
pub mod transcription_client;
