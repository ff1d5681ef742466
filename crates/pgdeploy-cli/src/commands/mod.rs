//! Command handlers grouped by concern.

pub(crate) mod cluster;
pub(crate) mod conf;
pub(crate) mod install;
