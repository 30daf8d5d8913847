pub mod classify;
pub mod ignore_set;
pub mod walker;

pub use classify::is_source_code;
pub use ignore_set::IgnoreSet;
pub use walker::{SourceFile, discover_files};
