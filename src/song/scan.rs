//! Finds playable files inside of a directory tree.

use std::path::{Path, PathBuf};

use tracing::debug;

/// The extensions which the enabled decoders can handle.
pub const EXTENSIONS: [&str; 4] = ["mp3", "ogg", "flac", "wav"];

/// Whether `path` looks like something that can be decoded.
pub fn supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Walks `root` and returns every supported file, sorted by path.
///
/// Directories which can't be read are skipped rather than failing the whole scan.
pub fn audio_files(root: &Path) -> Vec<PathBuf> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(directory) = pending.pop() {
        let entries = match std::fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(error) => {
                debug!("failed to read directory {}: {error}", directory.display());
                continue;
            }
        };

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(error) => {
                    debug!("failed to inspect {}: {error}", path.display());
                    continue;
                }
            };

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && supported(&path) {
                files.push(path);
            }
        }
    }

    files.sort_unstable();
    files
}
