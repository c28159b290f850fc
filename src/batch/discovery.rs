//! Input file discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default target extension
pub const DEFAULT_EXTENSION: &str = "wav";

/// Expand the command-line inputs into the list of files to check
///
/// Directories are searched recursively for files with `extension`
/// (case-insensitive), sorted by name. Plain files are kept when their
/// extension matches. Inputs that don't exist are logged and skipped.
/// Order follows the inputs; paths are made absolute.
pub fn discover_targets(inputs: &[PathBuf], extension: &str) -> Vec<PathBuf> {
    let extension = extension.trim_start_matches('.');
    let mut targets = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let before = targets.len();
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry)
                        if entry.file_type().is_file() && has_extension(entry.path(), extension) =>
                    {
                        targets.push(absolute(entry.path()));
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Skipping unreadable entry under {:?}: {}", input, e),
                }
            }
            log::debug!("Found {} target(s) in {:?}", targets.len() - before, input);
        } else if input.is_file() && has_extension(input, extension) {
            targets.push(absolute(input));
        } else {
            log::warn!("Input: {:?} not found!", input);
        }
    }

    targets
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
