use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::StatError;

/// Snapshot of a file's metadata, taken right before it is shown for review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub created: SystemTime,
    pub modified: SystemTime,
}

/// Reads size and timestamps for `path`.
///
/// Filesystems without a birth time report the inode change time instead on
/// Unix, and the modification time elsewhere.
pub fn get_file_info(path: &Path) -> Result<FileRecord, StatError> {
    let stat_error = |source| StatError {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(stat_error)?;
    let modified = metadata.modified().map_err(stat_error)?;
    let created = metadata
        .created()
        .ok()
        .or_else(|| change_time(&metadata))
        .unwrap_or(modified);

    Ok(FileRecord {
        path: path.to_path_buf(),
        size: metadata.len(),
        created,
        modified,
    })
}

#[cfg(unix)]
fn change_time(metadata: &fs::Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let secs = u64::try_from(metadata.ctime()).ok()?;
    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs, nanos))
}

#[cfg(not(unix))]
fn change_time(_metadata: &fs::Metadata) -> Option<SystemTime> {
    None
}

/// `YYYY-MM-DD HH:MM:SS` in the local offset, or UTC when the local offset is
/// unknown.
pub fn format_timestamp(timestamp: SystemTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let datetime = OffsetDateTime::from(timestamp).to_offset(offset);
    datetime
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_else(|_| datetime.to_string())
}

pub fn format_human_elapsed(elapsed: std::time::Duration) -> String {
    let elapsed_secs = elapsed.as_secs();
    let elapsed_subsec_millis = elapsed.subsec_millis();
    if elapsed_secs >= 3600 {
        let hours = elapsed_secs / 3600;
        let minutes = (elapsed_secs % 3600) / 60;
        let seconds = elapsed_secs % 60;
        format!("{hours}:{minutes:02}:{seconds:02}.{elapsed_subsec_millis:03} (h:mm:ss.mmm)")
    } else if elapsed_secs >= 60 {
        let minutes = elapsed_secs / 60;
        let seconds = elapsed_secs % 60;
        format!("{minutes}:{seconds:02}.{elapsed_subsec_millis:03} (m:ss.mmm)")
    } else {
        format!("{}.{:03} seconds", elapsed_secs, elapsed_subsec_millis)
    }
}
