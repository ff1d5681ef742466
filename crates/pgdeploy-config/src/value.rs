//! Scalar inputs and unit-tagged values.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::unit::Unit;

/// A single setting value before or after validation.
///
/// As parser input, [`Scalar::Text`] may carry a unit suffix (`"9.5TB"`).
/// Native variants never do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag.
    Boolean(bool),
    /// 64-bit integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// Text, possibly decorated with a unit suffix.
    Text(String),
}

impl Scalar {
    /// Type name reported in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "string",
        }
    }

    /// Convert an untyped JSON value for `property`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for `null` and
    /// [`ConfigError::UnsupportedValue`] for arrays, objects and numbers that
    /// fit neither `i64` nor `f64`.
    pub fn from_json(property: &str, value: &Value) -> ConfigResult<Self> {
        match value {
            Value::Null => Err(ConfigError::MissingValue {
                property: property.to_string(),
            }),
            Value::Bool(flag) => Ok(Self::Boolean(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Real))
                .ok_or_else(|| ConfigError::UnsupportedValue {
                    property: property.to_string(),
                    value: number.to_string(),
                }),
            Value::String(text) => Ok(Self::Text(text.clone())),
            other => Err(ConfigError::UnsupportedValue {
                property: property.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(flag) => write!(formatter, "{flag}"),
            Self::Integer(number) => write!(formatter, "{number}"),
            // Debug keeps the fractional part ("1.0"), so reals stay reals when re-read.
            Self::Real(number) => write!(formatter, "{number:?}"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Validated value together with its unit.
///
/// Carries no reference to the property it was validated against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedValue {
    value: Scalar,
    unit: Unit,
}

impl TypedValue {
    /// Pair a value with a unit.
    #[must_use]
    pub fn new(value: impl Into<Scalar>, unit: Unit) -> Self {
        Self {
            value: value.into(),
            unit,
        }
    }

    /// Unit-less value.
    #[must_use]
    pub fn plain(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::None)
    }

    /// Value in kilobytes.
    #[must_use]
    pub fn kb(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Kb)
    }

    /// Value in megabytes.
    #[must_use]
    pub fn mb(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Mb)
    }

    /// Value in gigabytes.
    #[must_use]
    pub fn gb(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Gb)
    }

    /// Value in terabytes.
    #[must_use]
    pub fn tb(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Tb)
    }

    /// Value in milliseconds.
    #[must_use]
    pub fn ms(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Ms)
    }

    /// Value in seconds.
    #[must_use]
    pub fn sec(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::S)
    }

    /// Value in minutes.
    #[must_use]
    pub fn min(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::Min)
    }

    /// Value in hours.
    #[must_use]
    pub fn hours(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::H)
    }

    /// Value in days.
    #[must_use]
    pub fn days(value: impl Into<Scalar>) -> Self {
        Self::new(value, Unit::D)
    }

    /// Wrapped value.
    #[must_use]
    pub const fn value(&self) -> &Scalar {
        &self.value
    }

    /// Attached unit.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }

    /// Text written to `postgresql.conf`: the value immediately followed by its unit suffix.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for TypedValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}{}", self.value, self.unit.suffix())
    }
}
