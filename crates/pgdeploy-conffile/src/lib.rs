#![forbid(unsafe_code)]
#![deny(
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Comment-aware editing of `postgresql.conf` style files.
//!
//! Layout: `line.rs` (line classification), `merge.rs` (merge engine),
//! `store.rs` (file access), `error.rs` (IO errors).

pub mod error;
pub mod line;
pub mod merge;
pub mod store;

pub use error::{ConfFileError, ConfFileResult};
pub use line::{ConfLine, LineKind};
pub use merge::{AppliedChange, MergeAction, MergeReport, merge_lines};
pub use store::{apply_to_file, overwrite, plan_for_file, read_lines, write_lines};
