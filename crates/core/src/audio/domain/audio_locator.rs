use std::path::PathBuf;

/// Domain interface for finding the audio file behind a dialogue identifier.
pub trait AudioLocator {
    fn locate(&self, identifier: &str) -> Option<PathBuf>;
}
