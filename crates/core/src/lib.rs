pub mod audio;
pub mod dialogue;
pub mod pipeline;
pub mod shared;
pub mod transcription;
