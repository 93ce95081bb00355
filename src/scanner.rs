use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{HumanCount, ProgressBar};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::filter::{split_name, ScanOptions};
use crate::hidden::HiddenDetector;

/// A visible file that passed the extension filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub base_name: OsString,
}

/// Walks `root` depth-first in file-name order and returns the files that
/// are eligible for grouping.
///
/// Excluded directories are pruned before descent and symlinks are not
/// followed. Entries that cannot be read are logged and skipped; only a
/// start directory that cannot be resolved is an error.
pub fn scan_directory(
    root: &Path,
    options: &ScanOptions,
    detector: &dyn HiddenDetector,
) -> Result<Vec<ScannedFile>> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: '{}'", root.display()))?;
    info!("Scanning {}", root.display());

    let pb = ProgressBar::new_spinner();
    pb.set_message("Scanning files...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut files = Vec::new();
    let mut total_files = 0u64;
    let mut total_dirs = 0u64;
    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let excluded = entry.file_type().is_dir() && options.excluded.contains(entry.path());
            if excluded {
                debug!("Excluded directory: '{}'", entry.path().display());
            }
            !excluded
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            total_dirs += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            continue;
        }
        total_files += 1;
        pb.set_message(format!("Scanning files... {} scanned", HumanCount(total_files)));

        let path = entry.path();
        if detector.is_hidden(path) {
            debug!("Skipping hidden file: '{}'", path.display());
            continue;
        }
        let (base_name, extension) = split_name(entry.file_name());
        if let Some(filter) = &options.extension {
            if !filter.matches(extension) {
                debug!("Skipping '{}': extension is not {}", path.display(), filter.as_str());
                continue;
            }
        }
        files.push(ScannedFile {
            path: path.to_path_buf(),
            base_name: base_name.to_os_string(),
        });
    }
    pb.finish_and_clear();

    info!(
        "Found {} files in {} directories, {} eligible",
        HumanCount(total_files),
        HumanCount(total_dirs),
        HumanCount(files.len() as u64)
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ExclusionSet, ExtensionFilter};
    use crate::hidden::DotFileDetector;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative.as_bytes()).unwrap();
    }

    fn names(files: &[ScannedFile], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_order_is_sorted_depth_first() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "b/one.txt");
        touch(&root, "a/two.txt");
        touch(&root, "a/inner/three.txt");
        touch(&root, "zero.txt");

        let files = scan_directory(&root, &ScanOptions::default(), &DotFileDetector).unwrap();
        assert_eq!(
            names(&files, &root),
            vec!["a/inner/three.txt", "a/two.txt", "b/one.txt", "zero.txt"]
        );
        assert_eq!(files[0].base_name, "three");
    }

    #[test]
    fn test_scan_skips_hidden_files() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, ".env");
        touch(&root, "visible.txt");

        let files = scan_directory(&root, &ScanOptions::default(), &DotFileDetector).unwrap();
        assert_eq!(names(&files, &root), vec!["visible.txt"]);
    }

    #[test]
    fn test_scan_applies_extension_filter() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "notes.TXT");
        touch(&root, "notes.md");
        touch(&root, "notes");

        let options = ScanOptions {
            extension: ExtensionFilter::new("txt"),
            ..Default::default()
        };
        let files = scan_directory(&root, &options, &DotFileDetector).unwrap();
        assert_eq!(names(&files, &root), vec!["notes.TXT"]);
    }

    #[test]
    fn test_scan_prunes_excluded_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        touch(&root, "keep/file.txt");
        touch(&root, "skip/file.txt");
        touch(&root, "skip/deeper/file.txt");
        touch(&root, "skipped-not/file.txt");

        let options = ScanOptions {
            excluded: ExclusionSet::new([root.join("skip")]),
            ..Default::default()
        };
        let files = scan_directory(&root, &options, &DotFileDetector).unwrap();
        assert_eq!(
            names(&files, &root),
            vec!["keep/file.txt", "skipped-not/file.txt"]
        );
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(scan_directory(&missing, &ScanOptions::default(), &DotFileDetector).is_err());
    }
}
