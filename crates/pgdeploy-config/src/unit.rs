//! Unit suffixes accepted by `PostgreSQL` settings.
//!
//! # Design
//! - Pure data: every unit knows the suffix it is written with in `postgresql.conf`.
//! - Groups describe which units a property accepts; order inside a group carries no meaning.

use std::fmt::{self, Display, Formatter};

use serde::{Serialize, Serializer};

/// Unit attached to a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    /// No unit; the empty suffix.
    None,
    /// Kilobytes (`kB`).
    Kb,
    /// Megabytes (`MB`).
    Mb,
    /// Gigabytes (`GB`).
    Gb,
    /// Terabytes (`TB`).
    Tb,
    /// Milliseconds (`ms`).
    Ms,
    /// Seconds (`s`).
    S,
    /// Minutes (`min`).
    Min,
    /// Hours (`h`).
    H,
    /// Days (`d`).
    D,
}

impl Unit {
    /// Every unit known to the table, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::None,
        Self::Kb,
        Self::Mb,
        Self::Gb,
        Self::Tb,
        Self::Ms,
        Self::S,
        Self::Min,
        Self::H,
        Self::D,
    ];

    /// Suffix text written after a value carrying this unit.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Kb => "kB",
            Self::Mb => "MB",
            Self::Gb => "GB",
            Self::Tb => "TB",
            Self::Ms => "ms",
            Self::S => "s",
            Self::Min => "min",
            Self::H => "h",
            Self::D => "d",
        }
    }

    /// Upper-case identifier used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Kb => "KB",
            Self::Mb => "MB",
            Self::Gb => "GB",
            Self::Tb => "TB",
            Self::Ms => "MS",
            Self::S => "S",
            Self::Min => "MIN",
            Self::H => "H",
            Self::D => "D",
        }
    }

    /// Group this unit belongs to.
    #[must_use]
    pub const fn group(self) -> UnitGroup {
        match self {
            Self::None => UnitGroup::None,
            Self::Kb | Self::Mb | Self::Gb | Self::Tb => UnitGroup::Bytes,
            Self::Ms | Self::S | Self::Min | Self::H | Self::D => UnitGroup::Time,
        }
    }

    /// Units from the whole table whose suffix ends `text`.
    ///
    /// `None` always matches since its suffix is empty.
    pub fn matching(text: &str) -> impl Iterator<Item = Self> + '_ {
        Self::ALL
            .into_iter()
            .filter(move |unit| text.ends_with(unit.suffix()))
    }
}

impl Display for Unit {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.suffix())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.suffix())
    }
}

/// Named set of units a property may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitGroup {
    /// Only unit-less values.
    None,
    /// Memory and storage sizes.
    Bytes,
    /// Durations.
    Time,
}

impl UnitGroup {
    /// Members of the group.
    #[must_use]
    pub const fn units(self) -> &'static [Unit] {
        match self {
            Self::None => &[Unit::None],
            Self::Bytes => &[Unit::Kb, Unit::Mb, Unit::Gb, Unit::Tb],
            Self::Time => &[Unit::Ms, Unit::S, Unit::Min, Unit::H, Unit::D],
        }
    }
}
