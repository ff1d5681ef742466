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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (sample texts and toolchain probes), fake_bin.rs (scripted
//! `pg_ctl` / `initdb` stand-ins), archive.rs (zip package builders).

pub mod archive;
pub mod fake_bin;
pub mod fixtures;
