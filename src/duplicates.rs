use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use indicatif::HumanCount;
use log::info;

use crate::filter::ScanOptions;
use crate::hidden::HiddenDetector;
use crate::scanner::{ScannedFile, scan_directory};

/// Files sharing a base name, in the order the walk found them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub name: OsString,
    pub paths: Vec<PathBuf>,
}

/// Scans `root` and groups eligible files by base name.
///
/// Groups come back in the order their base name was first seen, and every
/// group has at least two paths.
pub fn find_duplicates(
    root: &Path,
    options: &ScanOptions,
    detector: &dyn HiddenDetector,
) -> Result<Vec<DuplicateGroup>> {
    let files = scan_directory(root, options, detector)?;
    Ok(group_by_name(files))
}

pub fn group_by_name(files: Vec<ScannedFile>) -> Vec<DuplicateGroup> {
    let mut name_groups: Vec<DuplicateGroup> = Vec::new();
    let mut index: HashMap<OsString, usize> = HashMap::new();

    info!("Finding duplicates...");
    for file in files {
        match index.get(&file.base_name) {
            Some(&i) => name_groups[i].paths.push(file.path),
            None => {
                index.insert(file.base_name.clone(), name_groups.len());
                name_groups.push(DuplicateGroup {
                    name: file.base_name,
                    paths: vec![file.path],
                });
            }
        }
    }
    let unique_names = name_groups.len();

    // Filter out names seen only once
    name_groups.retain(|group| group.paths.len() > 1);

    let duplicate_files: usize = name_groups.iter().map(|group| group.paths.len()).sum();
    info!(
        "Duplicate analysis complete: {} unique names, {} duplicate groups, {} files",
        HumanCount(unique_names as u64),
        HumanCount(name_groups.len() as u64),
        HumanCount(duplicate_files as u64)
    );
    name_groups
}

pub fn print_summary(duplicates: &[DuplicateGroup]) {
    if duplicates.is_empty() {
        println!("{}", "No duplicate files found.".green());
        return;
    }
    let total_files: usize = duplicates.iter().map(|group| group.paths.len()).sum();
    println!(
        "{}",
        format!(
            "Found {} duplicate groups ({} files)",
            HumanCount(duplicates.len() as u64),
            HumanCount(total_files as u64)
        )
        .yellow()
    );
}
