//! Conversion of raw inputs into validated, unit-tagged values.
//!
//! # Design
//! - Native scalars never carry a unit; they must match the declared type exactly.
//! - Text picks the longest accepted unit suffix, so `kB` wins over a shorter
//!   tail match and `ms` wins over `s`.
//! - When text fails to parse and only the empty unit matched among the accepted
//!   units, but some other unit of the table ends the text, the caller most
//!   likely wrote a unit the property rejects (`"9.5TB"` for a unit-less real).
//!   That case reports [`ConfigError::UnitNotAvailable`]; it is a heuristic and
//!   inputs such as `"9ert5TB"` are classified the same way.

use crate::error::{ConfigError, ConfigResult};
use crate::property::{DataType, PropertyEntry};
use crate::unit::Unit;
use crate::value::{Scalar, TypedValue};

const BOOLEAN_TOKENS: [(&str, bool); 6] = [
    ("true", true),
    ("on", true),
    ("1", true),
    ("false", false),
    ("off", false),
    ("0", false),
];

/// Parse `raw` against `entry`.
///
/// # Errors
///
/// - [`ConfigError::UnitNotAvailable`] when the value's unit (or lack of one)
///   is not accepted by the property.
/// - [`ConfigError::WrongType`] when the value does not match the declared type.
pub fn parse_value(raw: &Scalar, entry: &PropertyEntry) -> ConfigResult<TypedValue> {
    match raw {
        Scalar::Text(text) => parse_text(text, entry),
        native => parse_native(native, entry),
    }
}

/// Check an already typed value against `entry`.
///
/// # Errors
///
/// - [`ConfigError::UnitNotAvailable`] when the unit is not accepted.
/// - [`ConfigError::WrongType`] when the value's type differs from the declared type.
pub fn validate_value(value: &TypedValue, entry: &PropertyEntry) -> ConfigResult<()> {
    if !entry.accepts(value.unit()) {
        return Err(unit_not_available(entry, value.value().to_string()));
    }
    if !type_matches(value.value(), entry.data_type()) {
        return Err(wrong_type(
            entry,
            value.value().type_name(),
            value.value().to_string(),
        ));
    }
    Ok(())
}

fn parse_native(value: &Scalar, entry: &PropertyEntry) -> ConfigResult<TypedValue> {
    if !entry.accepts(Unit::None) {
        return Err(unit_not_available(entry, value.to_string()));
    }
    if !type_matches(value, entry.data_type()) {
        return Err(wrong_type(entry, value.type_name(), value.to_string()));
    }
    Ok(TypedValue::new(value.clone(), Unit::None))
}

fn parse_text(text: &str, entry: &PropertyEntry) -> ConfigResult<TypedValue> {
    let Some(unit) = longest_suffix(text, entry.units()) else {
        return Err(unit_not_available(entry, text.to_string()));
    };

    let remainder = text[..text.len() - unit.suffix().len()].trim();
    let parsed = match entry.data_type() {
        DataType::Real => remainder.parse::<f64>().ok().map(Scalar::Real),
        DataType::Integer => remainder.parse::<i64>().ok().map(Scalar::Integer),
        DataType::Boolean => parse_boolean(remainder).map(Scalar::Boolean),
        DataType::String => Some(Scalar::Text(remainder.to_string())),
    };

    match parsed {
        Some(value) => Ok(TypedValue::new(value, unit)),
        None if unit == Unit::None && Unit::matching(text).count() > 1 => {
            Err(unit_not_available(entry, text.to_string()))
        }
        None => Err(wrong_type(entry, "string", remainder.to_string())),
    }
}

fn longest_suffix(text: &str, accepted: &[Unit]) -> Option<Unit> {
    accepted
        .iter()
        .copied()
        .filter(|unit| text.ends_with(unit.suffix()))
        .fold(None, |best: Option<Unit>, unit| match best {
            Some(current) if current.suffix().len() >= unit.suffix().len() => Some(current),
            _ => Some(unit),
        })
}

fn parse_boolean(token: &str) -> Option<bool> {
    BOOLEAN_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, value)| *value)
}

const fn type_matches(value: &Scalar, expected: DataType) -> bool {
    matches!(
        (value, expected),
        (Scalar::Boolean(_), DataType::Boolean)
            | (Scalar::Integer(_), DataType::Integer)
            | (Scalar::Real(_), DataType::Real)
            | (Scalar::Text(_), DataType::String)
    )
}

fn unit_not_available(entry: &PropertyEntry, value: String) -> ConfigError {
    ConfigError::UnitNotAvailable {
        property: entry.name().to_string(),
        available: entry.units().to_vec(),
        value,
    }
}

fn wrong_type(entry: &PropertyEntry, actual: &'static str, value: String) -> ConfigError {
    ConfigError::WrongType {
        property: entry.name().to_string(),
        expected: entry.data_type(),
        actual,
        value,
    }
}
