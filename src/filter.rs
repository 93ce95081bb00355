use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories whose whole subtree is left out of the scan.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    dirs: Vec<PathBuf>,
}

impl ExclusionSet {
    /// Builds the set from user input. Entries that exist are canonicalized,
    /// the rest are made absolute against the current directory.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dirs = dirs
            .into_iter()
            .filter_map(|dir| normalize(dir.as_ref()))
            .collect();
        Self { dirs }
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Prefix match by whole path components, so `/data/a` covers
    /// `/data/a/b` but not `/data/ab`.
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|excluded| dir.starts_with(excluded))
    }
}

fn normalize(dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() {
        return None;
    }
    fs::canonicalize(dir)
        .or_else(|_| std::path::absolute(dir))
        .ok()
}

/// Case-insensitive extension match, stored with its leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extension: String,
}

impl ExtensionFilter {
    /// `"TXT"`, `".txt"` and `" .Txt "` all give `.txt`. Blank input gives
    /// no filter.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();
        let extension = if lowered.starts_with('.') {
            lowered
        } else {
            format!(".{lowered}")
        };
        Some(Self { extension })
    }

    pub fn as_str(&self) -> &str {
        &self.extension
    }

    /// `extension` is the dotted suffix from [`split_name`], or empty.
    pub fn matches(&self, extension: &OsStr) -> bool {
        extension.to_string_lossy().to_lowercase() == self.extension
    }
}

/// Everything the duplicate finder needs from the user.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub extension: Option<ExtensionFilter>,
    pub excluded: ExclusionSet,
}

/// Splits a file name into base name and extension at the last dot. Leading
/// dots belong to the base name, and the extension keeps its dot.
///
/// Works on the raw encoded bytes, so names that are not valid UTF-8 keep
/// their identity.
pub fn split_name(file_name: &OsStr) -> (&OsStr, &OsStr) {
    let bytes = file_name.as_encoded_bytes();
    let leading_dots = bytes.iter().take_while(|&&b| b == b'.').count();
    match bytes[leading_dots..].iter().rposition(|&b| b == b'.') {
        Some(index) => {
            let (base, extension) = bytes.split_at(leading_dots + index);
            // SAFETY: both halves come from a valid encoded OsStr split
            // immediately before an ASCII '.'.
            unsafe {
                (
                    OsStr::from_encoded_bytes_unchecked(base),
                    OsStr::from_encoded_bytes_unchecked(extension),
                )
            }
        }
        None => (file_name, OsStr::new("")),
    }
}
