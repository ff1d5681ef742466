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

//! Logging setup shared by the pgdeploy binaries.
//!
//! Layout: `init.rs` (subscriber installation and formats), `context.rs`
//! (command spans), `error.rs`.

pub mod context;
pub mod error;
pub mod init;

pub use context::CommandSpan;
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
