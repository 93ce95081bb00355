pub mod cli;
pub mod duplicates;
pub mod error;
pub mod filter;
pub mod hidden;
pub mod scanner;
pub mod session;
pub mod utils;

pub use cli::Cli;
pub use duplicates::{DuplicateGroup, find_duplicates, group_by_name, print_summary};
pub use error::{DeleteError, ParseError, ProbeError, StatError};
pub use filter::{ExclusionSet, ExtensionFilter, ScanOptions};
pub use hidden::{DotFileDetector, HiddenDetector, platform_detector};
pub use scanner::{ScannedFile, scan_directory};
pub use session::{Console, ReviewSummary, Selection, parse_selection};
pub use utils::{FileRecord, format_human_elapsed, format_timestamp, get_file_info};
