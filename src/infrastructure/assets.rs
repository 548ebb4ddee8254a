use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Accepted image extensions, most preferred first
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Character illustrations stored as `<name>.<ext>` in one directory
#[derive(Debug, Clone)]
pub struct CharacterImages {
    dir: PathBuf,
}

impl CharacterImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn find(&self, name: &str) -> Option<PathBuf> {
        find_character_image(&self.dir, name)
    }
}

/// Find the image whose base name is canonically equivalent to `name`.
///
/// Both sides are compared in NFC, so a file saved with decomposed Hangul
/// jamo still matches a composed name. Returns `None` when the directory
/// cannot be read or holds no equivalent file.
pub fn find_character_image(dir: &Path, name: &str) -> Option<PathBuf> {
    let wanted: String = name.trim().nfc().collect();
    if wanted.is_empty() {
        return None;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "Image directory not readable");
            return None;
        }
    };

    let mut best: Option<(usize, String, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let (Some(stem), Some(extension)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };

        let extension = extension.to_ascii_lowercase();
        let Some(rank) = IMAGE_EXTENSIONS.iter().position(|ext| *ext == extension) else {
            continue;
        };

        if !stem.nfc().eq(wanted.chars()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let is_better = match &best {
            None => true,
            Some((best_rank, best_name, _)) => (rank, &file_name) < (*best_rank, best_name),
        };
        if is_better {
            best = Some((rank, file_name, path));
        }
    }

    best.map(|(_, _, path)| path)
}
