//! Line-oriented interaction with the user: collecting scan options and
//! reviewing duplicate groups one by one.
//!
//! [`Console`] is generic over its input and output so that it can be driven
//! from in-memory buffers.

use std::fs;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::HumanBytes;
use log::{debug, info};

use crate::duplicates::DuplicateGroup;
use crate::error::{DeleteError, ParseError};
use crate::filter::{ExclusionSet, ExtensionFilter, ScanOptions};
use crate::utils::{FileRecord, format_timestamp, get_file_info};

/// What the user asked for on one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Skip,
    Delete(Vec<i64>),
}

/// Parses `skip` (any case) or a comma-separated list of integers. A single
/// bad token rejects the whole line.
pub fn parse_selection(line: &str) -> Result<Selection, ParseError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("skip") {
        return Ok(Selection::Skip);
    }
    line.split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| ParseError::NotANumber(token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Selection::Delete)
}

/// Tally of one review pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    pub groups_reviewed: usize,
    pub groups_skipped: usize,
    pub groups_unreadable: usize,
    pub invalid_inputs: usize,
    pub invalid_indices: usize,
    pub files_deleted: usize,
    pub bytes_freed: u64,
    pub delete_failures: usize,
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prints `prompt` and reads one line. `None` at end of input.
    pub fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// `yes` or `y`, in any case, is a yes. Anything else, including end of
    /// input, is a no.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(prompt)?.unwrap_or_default();
        Ok(matches!(answer.trim().to_lowercase().as_str(), "yes" | "y"))
    }

    /// Asks which directories to exclude and which extension to filter on.
    pub fn collect_options(&mut self) -> Result<ScanOptions> {
        let mut options = ScanOptions::default();

        if self.confirm("Do you want to exclude any directories? (yes/no): ")? {
            let line = self
                .ask("Enter the full paths of directories to exclude (comma-separated):\n")?
                .unwrap_or_default();
            options.excluded = ExclusionSet::new(
                line.split(',').map(str::trim).filter(|dir| !dir.is_empty()),
            );
            for dir in options.excluded.dirs() {
                info!("Excluding directory: '{}'", dir.display());
            }
        }

        if self.confirm("Do you want to find duplicates for a specific file type? (yes/no): ")? {
            let line = self
                .ask("Enter the file extension (e.g., '.txt', '.jpg', '.pdf'): ")?
                .unwrap_or_default();
            options.extension = ExtensionFilter::new(&line);
            if let Some(filter) = &options.extension {
                info!("Filtering by extension: {}", filter.as_str());
            }
        }

        Ok(options)
    }

    /// Walks through every group, showing metadata and deleting what the user
    /// selects. Deleted paths are removed from their group.
    pub fn review(&mut self, groups: &mut [DuplicateGroup]) -> Result<ReviewSummary> {
        let mut summary = ReviewSummary::default();

        for group in groups.iter_mut() {
            writeln!(
                self.output,
                "\n{}",
                format!(
                    "Duplicate files found for '{}':",
                    group.name.to_string_lossy()
                )
                .bold()
            )?;

            let records = match group
                .paths
                .iter()
                .map(|path| get_file_info(path))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(records) => records,
                Err(e) => {
                    writeln!(self.output, "  {} {}", "Skipping group:".red(), e)?;
                    summary.groups_unreadable += 1;
                    continue;
                }
            };
            for (i, record) in records.iter().enumerate() {
                self.print_record(i, record)?;
            }

            let Some(line) =
                self.ask("Enter the numbers of files to delete (comma-separated, or 'skip'): ")?
            else {
                info!("End of input, leaving remaining groups untouched");
                break;
            };
            summary.groups_reviewed += 1;

            match parse_selection(&line) {
                Ok(Selection::Skip) => {
                    debug!("Skipped group '{}'", group.name.to_string_lossy());
                    summary.groups_skipped += 1;
                }
                Ok(Selection::Delete(indices)) => {
                    self.delete_selected(group, &records, &indices, &mut summary)?;
                }
                Err(e) => {
                    writeln!(
                        self.output,
                        "  {} ({}). Please enter numbers or 'skip'.",
                        "Invalid input".red(),
                        e
                    )?;
                    summary.invalid_inputs += 1;
                }
            }
        }

        Ok(summary)
    }

    fn print_record(&mut self, index: usize, record: &FileRecord) -> Result<()> {
        writeln!(self.output, "  [{}] {}", index, record.path.display())?;
        writeln!(
            self.output,
            "      Size: {} bytes ({})",
            record.size,
            HumanBytes(record.size)
        )?;
        writeln!(self.output, "      Created: {}", format_timestamp(record.created))?;
        writeln!(self.output, "      Modified: {}", format_timestamp(record.modified))?;
        Ok(())
    }

    fn delete_selected(
        &mut self,
        group: &mut DuplicateGroup,
        records: &[FileRecord],
        indices: &[i64],
        summary: &mut ReviewSummary,
    ) -> Result<()> {
        let mut deleted = vec![false; group.paths.len()];

        for &idx in indices {
            let Some(i) = usize::try_from(idx).ok().filter(|&i| i < group.paths.len()) else {
                writeln!(self.output, "  {} {}", "Invalid index:".red(), idx)?;
                summary.invalid_indices += 1;
                continue;
            };
            let path = &group.paths[i];
            match fs::remove_file(path).map_err(|source| DeleteError {
                path: path.clone(),
                source,
            }) {
                Ok(()) => {
                    writeln!(self.output, "  {} {}", "Deleted:".green(), path.display())?;
                    info!("Deleted '{}'", path.display());
                    deleted[i] = true;
                    summary.files_deleted += 1;
                    summary.bytes_freed += records[i].size;
                }
                Err(e) => {
                    writeln!(self.output, "  {} {}", "Error:".red(), e)?;
                    summary.delete_failures += 1;
                }
            }
        }

        let mut flags = deleted.into_iter();
        group.paths.retain(|_| !flags.next().unwrap_or(false));
        Ok(())
    }
}
