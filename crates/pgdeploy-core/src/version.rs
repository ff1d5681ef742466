//! `PostgreSQL` versions and target platforms.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::DeployError;

/// Major version of a `PostgreSQL` release.
///
/// Releases before 10 use two numbers (`9.6`), later ones a single number (`10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum PostgresMajorVersion {
    /// Two-part major version such as `9.6`.
    Pre10(u32, u32),
    /// Single-part major version such as `15`.
    Post10(u32),
}

impl FromStr for PostgresMajorVersion {
    type Err = DeployError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DeployError::InvalidVersion {
            value: value.to_string(),
        };
        let parts: Vec<&str> = value.trim().split('.').collect();
        match parts.as_slice() {
            [major] => major.parse().map(Self::Post10).map_err(|_| invalid()),
            [first, second] => {
                let first = first.parse().map_err(|_| invalid())?;
                let second = second.parse().map_err(|_| invalid())?;
                Ok(Self::Pre10(first, second))
            }
            _ => Err(invalid()),
        }
    }
}

impl Display for PostgresMajorVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre10(first, second) => write!(formatter, "{first}.{second}"),
            Self::Post10(major) => write!(formatter, "{major}"),
        }
    }
}

impl From<PostgresMajorVersion> for String {
    fn from(version: PostgresMajorVersion) -> Self {
        version.to_string()
    }
}

/// Operating system and architecture pair, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    /// Build a platform; both parts are lower-cased.
    #[must_use]
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_lowercase(),
            arch: arch.to_lowercase(),
        }
    }

    /// Platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Operating system.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// `os_arch` form used in package names.
    #[must_use]
    pub fn to_file_string(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl Display for Platform {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}_{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = DeployError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().split_once('_') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => Ok(Self::new(os, arch)),
            _ => Err(DeployError::InvalidPlatform {
                value: value.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_parse_by_part_count() {
        assert_eq!(
            "9.6".parse::<PostgresMajorVersion>().expect("pre 10"),
            PostgresMajorVersion::Pre10(9, 6)
        );
        assert_eq!(
            "16".parse::<PostgresMajorVersion>().expect("post 10"),
            PostgresMajorVersion::Post10(16)
        );
        for bad in ["", "9.6.1", "ten", "9.x"] {
            assert!(bad.parse::<PostgresMajorVersion>().is_err(), "{bad}");
        }
        assert_eq!(PostgresMajorVersion::Pre10(9, 6).to_string(), "9.6");
    }

    #[test]
    fn platforms_are_lowercase() {
        let platform = Platform::new("Linux", "X86_64");
        assert_eq!(platform.to_file_string(), "linux_x86_64");
        assert_eq!("linux_x86_64".parse::<Platform>().expect("parse"), platform);
        assert!("linux".parse::<Platform>().is_err());
        assert_eq!(Platform::current().os(), std::env::consts::OS);
    }
}
