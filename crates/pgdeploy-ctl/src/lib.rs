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

//! Wrappers around the `PostgreSQL` command line tools.
//!
//! Layout: `process.rs` (binary execution), `pg_ctl.rs` (server control),
//! `initdb.rs` (cluster creation options and invocation), `error.rs`.

pub mod error;
pub mod initdb;
pub mod pg_ctl;
pub mod process;

pub use error::{CtlError, CtlResult};
pub use initdb::{ClusterCreationOptions, run_initdb};
pub use pg_ctl::{PgCtl, ServerStatus};
pub use process::run_binary;
