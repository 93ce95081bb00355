use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "find-name-dups", version)]
#[command(about = "Find files sharing a base name and choose which copies to delete")]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["find-name-dups"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_path_and_verbose() {
        let cli = Cli::try_parse_from(["find-name-dups", "-v", "/data"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("/data"));
        assert!(cli.verbose);
    }
}
