use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::domain::audio_locator::AudioLocator;
use crate::shared::constants::{AUDIO_EXTENSION, MAX_SEARCH_RESULTS};
use crate::shared::settings::Settings;

/// Maps dialogue identifiers to `.wav` files on disk.
///
/// Resolution order:
/// 1. `<audio_dir>/<identifier>.wav`
/// 2. A bounded walk of the workspace for `.wav` files below a directory
///    named in `search_dirs`, matched by exact file stem
#[derive(Debug, Clone)]
pub struct AudioResolver {
    audio_dir: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    search_dirs: Vec<String>,
    max_results: usize,
}

impl AudioResolver {
    pub fn new(
        audio_dir: Option<PathBuf>,
        workspace_root: Option<PathBuf>,
        search_dirs: Vec<String>,
    ) -> Self {
        Self {
            audio_dir,
            workspace_root,
            search_dirs,
            max_results: MAX_SEARCH_RESULTS,
        }
    }

    pub fn from_settings(settings: &Settings, workspace_root: Option<PathBuf>) -> Self {
        Self::new(
            settings.audio_dir(),
            workspace_root,
            settings.search_dirs.clone(),
        )
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn resolve(&self, identifier: &str) -> Option<PathBuf> {
        if let Some(dir) = &self.audio_dir {
            let direct = dir.join(format!("{identifier}.{AUDIO_EXTENSION}"));
            if direct.is_file() {
                return Some(direct);
            }
            log::debug!("{} not found, searching workspace", direct.display());
        }

        let root = self.workspace_root.as_ref()?;
        self.search_workspace(root, identifier)
    }

    fn search_workspace(&self, root: &Path, identifier: &str) -> Option<PathBuf> {
        let candidates = self.collect_candidates(root);
        candidates
            .into_iter()
            .find(|path| path.file_stem().and_then(|s| s.to_str()) == Some(identifier))
    }

    /// Audio files below a search directory, capped at `max_results`.
    /// Directory entries are visited in sorted order.
    fn collect_candidates(&self, root: &Path) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        let mut stack = vec![(root.to_path_buf(), false)];

        while let Some((dir, inside_search_dir)) = stack.pop() {
            let mut entries: Vec<PathBuf> = match fs::read_dir(&dir) {
                Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
                Err(e) => {
                    log::debug!("Skipping {}: {e}", dir.display());
                    continue;
                }
            };
            entries.sort();

            let mut subdirs = Vec::new();
            for path in entries {
                if path.is_dir() {
                    let is_search_dir = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| self.search_dirs.iter().any(|d| d == n))
                        .unwrap_or(false);
                    subdirs.push((path, inside_search_dir || is_search_dir));
                } else if inside_search_dir && has_audio_extension(&path) {
                    candidates.push(path);
                    if candidates.len() >= self.max_results {
                        log::warn!(
                            "Workspace audio search stopped after {} files",
                            self.max_results
                        );
                        return candidates;
                    }
                }
            }
            // Reverse so the stack pops subdirectories in sorted order.
            stack.extend(subdirs.into_iter().rev());
        }

        candidates
    }
}

impl AudioLocator for AudioResolver {
    fn locate(&self, identifier: &str) -> Option<PathBuf> {
        self.resolve(identifier)
    }
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(AUDIO_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"RIFF").unwrap();
    }

    fn search_dirs() -> Vec<String> {
        vec!["Speech".to_string(), "Sounds".to_string()]
    }

    #[test]
    fn test_direct_hit_in_audio_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("DIA_001.wav");
        touch(&file);

        let resolver = AudioResolver::new(Some(tmp.path().to_path_buf()), None, search_dirs());
        assert_eq!(resolver.resolve("DIA_001"), Some(file));
    }

    #[test]
    fn test_falls_back_to_workspace_search() {
        let tmp = TempDir::new().unwrap();
        let audio_dir = tmp.path().join("empty");
        fs::create_dir_all(&audio_dir).unwrap();
        let nested = tmp.path().join("_work/Data/Sound/Speech/Xardas/DIA_001.WAV");
        touch(&nested);

        let resolver = AudioResolver::new(
            Some(audio_dir),
            Some(tmp.path().to_path_buf()),
            search_dirs(),
        );
        assert_eq!(resolver.resolve("DIA_001"), Some(nested));
    }

    #[test]
    fn test_workspace_search_requires_search_dir() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Music/DIA_001.wav"));

        let resolver = AudioResolver::new(None, Some(tmp.path().to_path_buf()), search_dirs());
        assert!(resolver.resolve("DIA_001").is_none());
    }

    #[test]
    fn test_workspace_match_is_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Speech/dia_001.wav"));

        let resolver = AudioResolver::new(None, Some(tmp.path().to_path_buf()), search_dirs());
        assert!(resolver.resolve("DIA_001").is_none());
    }

    #[test]
    fn test_first_match_in_sorted_order_wins() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("A/Speech/DIA_001.wav");
        let b = tmp.path().join("B/Sounds/DIA_001.wav");
        touch(&b);
        touch(&a);

        let resolver = AudioResolver::new(None, Some(tmp.path().to_path_buf()), search_dirs());
        assert_eq!(resolver.resolve("DIA_001"), Some(a));
    }

    #[test]
    fn test_search_is_capped() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Speech/A.wav"));
        touch(&tmp.path().join("Speech/B.wav"));
        touch(&tmp.path().join("Speech/C.wav"));

        let resolver = AudioResolver::new(None, Some(tmp.path().to_path_buf()), search_dirs())
            .with_max_results(2);
        assert!(resolver.resolve("B").is_some());
        assert!(resolver.resolve("C").is_none());
    }

    #[test]
    fn test_not_found_returns_none() {
        let tmp = TempDir::new().unwrap();
        let resolver = AudioResolver::new(
            Some(tmp.path().join("missing")),
            Some(tmp.path().join("also-missing")),
            search_dirs(),
        );
        assert!(resolver.resolve("DIA_404").is_none());
    }

    #[test]
    fn test_no_dirs_configured_returns_none() {
        let resolver = AudioResolver::new(None, None, search_dirs());
        assert!(resolver.resolve("DIA_001").is_none());
    }

    #[test]
    fn test_from_settings_uses_audio_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("SVM_1_Hi.wav");
        touch(&file);
        let mut settings = Settings::default();
        settings.audio_dir = tmp.path().display().to_string();

        let resolver = AudioResolver::from_settings(&settings, None);
        assert_eq!(resolver.resolve("SVM_1_Hi"), Some(file));
    }
}
