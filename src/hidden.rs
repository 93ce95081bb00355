//! Hidden-file detection.
//!
//! A file is hidden when its name starts with `.`, on every platform. On top
//! of that each platform has its own marker:
//!
//! - Windows: the `FILE_ATTRIBUTE_HIDDEN` bit.
//! - macOS and FreeBSD: the `UF_HIDDEN` file flag (`chflags hidden`).
//! - Other Unix: the flags column of `ls -lO`, when the local `ls` has it.
//!
//! The platform variant is picked once by [`platform_detector`].

use std::path::Path;

use log::warn;

use crate::error::ProbeError;

pub trait HiddenDetector {
    /// Platform-specific hidden marker, without the dot-prefix rule.
    fn probe_attributes(&self, path: &Path) -> Result<bool, ProbeError>;

    /// Whether `path` should be treated as hidden. Probe errors are logged
    /// and count as "not hidden".
    fn is_hidden(&self, path: &Path) -> bool {
        if has_dot_prefix(path) {
            return true;
        }
        match self.probe_attributes(path) {
            Ok(hidden) => hidden,
            Err(e) => {
                warn!("Error checking hidden attribute for '{}': {}", path.display(), e);
                false
            }
        }
    }
}

/// True when the final path segment starts with `.`.
pub fn has_dot_prefix(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Picks the detector for the platform this binary was built for.
pub fn platform_detector() -> Box<dyn HiddenDetector> {
    #[cfg(windows)]
    {
        Box::new(WindowsDetector)
    }
    #[cfg(unix)]
    {
        Box::new(UnixDetector::new())
    }
    #[cfg(not(any(windows, unix)))]
    {
        Box::new(DotFileDetector)
    }
}

/// Only the dot-prefix rule applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotFileDetector;

impl HiddenDetector for DotFileDetector {
    fn probe_attributes(&self, _path: &Path) -> Result<bool, ProbeError> {
        Ok(false)
    }
}

#[cfg(windows)]
const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsDetector;

#[cfg(windows)]
impl HiddenDetector for WindowsDetector {
    fn probe_attributes(&self, path: &Path) -> Result<bool, ProbeError> {
        use std::os::windows::fs::MetadataExt;

        let metadata = std::fs::symlink_metadata(path).map_err(|source| ProbeError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
    }
}

#[cfg(unix)]
#[derive(Debug)]
pub struct UnixDetector {
    listing: Option<ListingProbe>,
}

#[cfg(unix)]
impl UnixDetector {
    /// Native flags are used where the platform has them; otherwise the
    /// `ls -lO` probe is enabled if the local `ls` accepts `-O`.
    pub fn new() -> Self {
        let listing = if has_native_flags() {
            None
        } else {
            ListingProbe::detect("ls")
        };
        Self { listing }
    }

    /// Detector that never shells out, whatever the platform offers.
    pub fn without_listing() -> Self {
        Self { listing: None }
    }
}

#[cfg(unix)]
impl Default for UnixDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl HiddenDetector for UnixDetector {
    fn probe_attributes(&self, path: &Path) -> Result<bool, ProbeError> {
        if let Some(hidden) = native_hidden_flag(path)? {
            return Ok(hidden);
        }
        match &self.listing {
            Some(probe) => probe.probe(path),
            None => Ok(false),
        }
    }
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
const UF_HIDDEN: u32 = 0x0000_8000;

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn has_native_flags() -> bool {
    true
}

#[cfg(all(unix, not(any(target_os = "macos", target_os = "freebsd"))))]
fn has_native_flags() -> bool {
    false
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn native_hidden_flag(path: &Path) -> Result<Option<bool>, ProbeError> {
    #[cfg(target_os = "freebsd")]
    use std::os::freebsd::fs::MetadataExt;
    #[cfg(target_os = "macos")]
    use std::os::macos::fs::MetadataExt;

    let metadata = std::fs::symlink_metadata(path).map_err(|source| ProbeError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(metadata.st_flags() & UF_HIDDEN != 0))
}

#[cfg(all(unix, not(any(target_os = "macos", target_os = "freebsd"))))]
fn native_hidden_flag(_path: &Path) -> Result<Option<bool>, ProbeError> {
    Ok(None)
}

/// Asks `ls -lO` for the file flags of a path.
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct ListingProbe {
    program: String,
}

#[cfg(unix)]
impl ListingProbe {
    /// Returns a probe only if `program -lO .` succeeds here.
    pub fn detect(program: &str) -> Option<Self> {
        use std::process::{Command, Stdio};

        let supported = Command::new(program)
            .args(["-lOd", "."])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if supported {
            log::debug!("Using `{} -lO` to detect hidden file flags", program);
            Some(Self {
                program: program.to_string(),
            })
        } else {
            log::debug!("`{} -lO` unavailable, hidden detection uses names only", program);
            None
        }
    }

    pub fn probe(&self, path: &Path) -> Result<bool, ProbeError> {
        use std::process::{Command, Stdio};

        let output = Command::new(&self.program)
            .arg("-lOd")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                path: path.to_path_buf(),
                source,
            })?;
        if !output.status.success() {
            log::debug!(
                "`{} -lO` exited with {} for '{}'",
                self.program,
                output.status,
                path.display()
            );
            return Ok(false);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .next()
            .map(listing_marks_hidden)
            .unwrap_or(false))
    }
}

/// Column of BSD `ls -lO` output holding the file flags: mode, links,
/// owner, group, then flags.
const FLAGS_COLUMN: usize = 4;

/// Looks for a `hidden` entry in the flags column of one line of `ls -lO`
/// output. Owner, group and file name never count.
pub fn listing_marks_hidden(line: &str) -> bool {
    line.split_whitespace()
        .nth(FLAGS_COLUMN)
        .map(|flags| flags.split(',').any(|flag| flag == "hidden"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs::File;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct FailingDetector;

    impl HiddenDetector for FailingDetector {
        fn probe_attributes(&self, path: &Path) -> Result<bool, ProbeError> {
            Err(ProbeError::Metadata {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            })
        }
    }

    #[test]
    fn test_dot_prefix() {
        assert!(has_dot_prefix(Path::new(".hidden")));
        assert!(has_dot_prefix(Path::new("/some/dir/.bashrc")));
        assert!(!has_dot_prefix(Path::new("visible.txt")));
        assert!(!has_dot_prefix(Path::new("/some/.dir/visible.txt")));
        assert!(!has_dot_prefix(Path::new("/")));
    }

    #[test]
    fn test_dot_rule_short_circuits_probe() {
        // A failing probe is never reached for dot files.
        assert!(FailingDetector.is_hidden(Path::new("/tmp/.secret")));
    }

    #[test]
    fn test_probe_error_fails_open() {
        assert!(!FailingDetector.is_hidden(Path::new("/tmp/visible.txt")));
    }

    #[test]
    fn test_platform_detector_on_plain_file() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        File::create(&plain).unwrap();
        let dotted = dir.path().join(".dotted");
        File::create(&dotted).unwrap();

        let detector = platform_detector();
        assert!(!detector.is_hidden(&plain));
        assert!(detector.is_hidden(&dotted));
    }

    #[test]
    fn test_missing_file_is_not_hidden() {
        let detector = platform_detector();
        assert!(!detector.is_hidden(Path::new("/definitely/not/here/file.txt")));
    }

    #[test]
    fn test_listing_flags_column() {
        let hidden = "-rw-r--r--  1 me  staff  hidden 12 Oct 16 10:00 /Users/me/report.txt";
        let combined = "-rw-r--r--  1 me  staff  uchg,hidden 12 Oct 16 10:00 /Users/me/report.txt";
        let visible = "-rw-r--r--  1 me  staff  - 12 Oct 16 10:00 /Users/me/report.txt";
        assert!(listing_marks_hidden(hidden));
        assert!(listing_marks_hidden(combined));
        assert!(!listing_marks_hidden(visible));
    }

    #[test]
    fn test_listing_ignores_other_columns() {
        let named = "-rw-r--r--  1 me  staff  - 12 Oct 16 10:00 /data/hidden";
        let owner = "-rw-r--r--  1 hidden  staff  - 12 Oct 16 10:00 /data/report.txt";
        let group = "-rw-r--r--  1 me  hidden  - 12 Oct 16 10:00 /data/report.txt";
        assert!(!listing_marks_hidden(named));
        assert!(!listing_marks_hidden(owner));
        assert!(!listing_marks_hidden(group));
        assert!(!listing_marks_hidden(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_listing_probe_missing_program() {
        assert!(ListingProbe::detect("/nonexistent/ls-that-is-not-there").is_none());

        let probe = ListingProbe {
            program: "/nonexistent/ls-that-is-not-there".to_string(),
        };
        let err = probe.probe(Path::new("file.txt")).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_detector_without_listing() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        File::create(&plain).unwrap();
        assert!(!UnixDetector::without_listing().is_hidden(&plain));
    }

    proptest! {
        #[test]
        fn test_dot_names_are_always_hidden(
            parents in prop::collection::vec("[a-zA-Z0-9_ -]{1,10}", 0..4),
            name in "\\.[^/\\\\]{0,20}",
        ) {
            prop_assume!(name != "." && name != "..");
            let path: PathBuf = parents.iter().map(String::as_str).chain([name.as_str()]).collect();

            prop_assert!(has_dot_prefix(&path));
            prop_assert!(FailingDetector.is_hidden(&path));
            prop_assert!(DotFileDetector.is_hidden(&path));
        }
    }
}
