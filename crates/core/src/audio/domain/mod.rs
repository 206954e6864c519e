pub mod audio_locator;
pub mod playback_controller;
pub mod player;
