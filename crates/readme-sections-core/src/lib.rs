pub mod error;
pub mod fs;
mod lines;
pub mod matcher;
pub mod merger;
pub mod section;
pub mod store;

pub use error::{ExitCode, SectionError, SectionResult};
pub use fs::{DocumentFs, MemoryFs, OverlayFs, StdFs, DEFAULT_FILE_MODE};
pub use matcher::{find_section, section_titles, SectionMatch, SectionMatcher};
pub use merger::{
    merge_section, MergeAction, MergeOptions, MergeOutcome, Merged, SectionMerger,
    DEFAULT_DOCUMENT,
};
pub use section::{bullet_list, Section};
pub use store::{FlushReport, SectionStore};
