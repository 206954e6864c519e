pub mod audio_resolver;
pub mod system_player_launcher;
