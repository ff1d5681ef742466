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

//! Typed `PostgreSQL` setting model with a unit-aware value parser.
//!
//! Layout: `unit.rs` (unit table and groups), `property.rs` (catalog entries),
//! `catalog.rs` (catalog sources), `value.rs` (scalars and typed values),
//! `parse.rs` (parser/validator), `set.rs` (builder and immutable set).

pub mod catalog;
pub mod error;
pub mod parse;
pub mod property;
pub mod set;
pub mod unit;
pub mod value;

pub use catalog::{PropertyCatalog, TableCatalog};
pub use error::{ConfigError, ConfigResult};
pub use parse::{parse_value, validate_value};
pub use property::{DataType, PropertyEntry};
pub use set::{ConfigurationSet, ConfigurationSetBuilder, parse_property_map};
pub use unit::{Unit, UnitGroup};
pub use value::{Scalar, TypedValue};
