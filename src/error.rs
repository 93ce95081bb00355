use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while asking the filesystem (or `ls`) whether a file is hidden.
///
/// Never fatal: the classifier logs it and treats the file as visible.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read attributes of '{path}': {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run `{program}` for '{path}': {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Metadata for a file under review could not be read.
#[derive(Debug, Error)]
#[error("failed to read metadata for '{path}': {source}")]
pub struct StatError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// A deletion selection that is neither `skip` nor a list of integers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
}

/// The filesystem refused to remove a selected file.
#[derive(Debug, Error)]
#[error("failed to delete '{path}': {source}")]
pub struct DeleteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
