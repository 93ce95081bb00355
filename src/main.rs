use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{HumanBytes, HumanCount};
use log::{debug, error, info};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

use find_name_dups::{
    Cli, Console, find_duplicates, format_human_elapsed, platform_detector, print_summary,
};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    let mut log_config = ConfigBuilder::new();
    // Falls back to UTC timestamps when the local offset is unknown
    let _ = log_config.set_time_offset_to_local();
    TermLogger::init(
        if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info },
        log_config.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    info!("Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    debug!("Command line arguments: {:?}", cli);

    let absolute_path = cli
        .path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", cli.path.display()))?;
    if !absolute_path.is_dir() {
        error!("Path is not a directory: {}", absolute_path.display());
        anyhow::bail!("Path is not a directory: {}", absolute_path.display());
    }
    info!("Target directory: '{}'", absolute_path.display());

    let detector = platform_detector();
    let mut console = Console::new(io::stdin().lock(), io::stdout());
    let options = console.collect_options()?;

    let mut duplicates = find_duplicates(&absolute_path, &options, detector.as_ref())?;
    print_summary(&duplicates);

    if !duplicates.is_empty() {
        let summary = console.review(&mut duplicates)?;
        info!(
            "Reviewed {} groups: {} files deleted ({}), {} deletions failed",
            HumanCount(summary.groups_reviewed as u64),
            HumanCount(summary.files_deleted as u64),
            HumanBytes(summary.bytes_freed),
            HumanCount(summary.delete_failures as u64)
        );
    }

    info!(
        "Program completed successfully in {}",
        format_human_elapsed(start_time.elapsed())
    );
    Ok(())
}
