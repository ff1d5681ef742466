//! Line model for `key = value` configuration files.
//!
//! # Design
//! - Classification never alters the line; [`ConfLine::raw`] returns the exact input.
//! - The first `=` splits key from value. A key starting with `#` marks a
//!   commented declaration whose effective key is the remainder, trimmed.
//! - Lines without `=` are opaque.

use serde::Serialize;

const COMMENT: char = '#';
const QUOTE: char = '\'';

/// Classification of a configuration file line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    /// Live `key = value` declaration.
    Active {
        /// Trimmed key.
        key: String,
        /// Trimmed text after the first `=`.
        value: String,
    },
    /// Disabled `#key = value` declaration.
    Commented {
        /// Trimmed key without the comment marker.
        key: String,
        /// Trimmed text after the first `=`.
        value: String,
    },
    /// Anything else, passed through untouched.
    Opaque,
}

/// One line of a configuration file together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfLine {
    raw: String,
    kind: LineKind,
}

impl ConfLine {
    /// Classify `line`.
    #[must_use]
    pub fn parse(line: impl Into<String>) -> Self {
        let raw = line.into();
        let kind = classify(&raw);
        Self { raw, kind }
    }

    /// New active declaration rendered as `key=value`.
    #[must_use]
    pub fn active(key: &str, value: &str) -> Self {
        Self {
            raw: format!("{key}={value}"),
            kind: LineKind::Active {
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }

    /// New commented declaration rendered as `#key=value`.
    #[must_use]
    pub fn commented(key: &str, value: &str) -> Self {
        Self {
            raw: format!("{COMMENT}{key}={value}"),
            kind: LineKind::Commented {
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }

    /// Line text exactly as read or rendered.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Classification.
    #[must_use]
    pub const fn kind(&self) -> &LineKind {
        &self.kind
    }

    /// Key of an active declaration.
    #[must_use]
    pub fn active_key(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Active { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Key of a commented declaration.
    #[must_use]
    pub fn commented_key(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Commented { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Trimmed text after the first `=`, inline comment included, or `None`
    /// for opaque lines.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Active { value, .. } | LineKind::Commented { value, .. } => Some(value),
            LineKind::Opaque => None,
        }
    }

    /// Declared setting with any trailing inline comment removed, or `None`
    /// for opaque lines.
    ///
    /// `shared_buffers = 128MB  # min 128kB` yields `128MB`.
    #[must_use]
    pub fn setting(&self) -> Option<&str> {
        match &self.kind {
            LineKind::Active { value, .. } | LineKind::Commented { value, .. } => {
                Some(strip_inline_comment(value))
            }
            LineKind::Opaque => None,
        }
    }

    /// Whether the declared setting is the same as `rendered`.
    ///
    /// The full value is compared first, so `a#b` matches itself; otherwise
    /// the trailing inline comment is ignored. One pair of surrounding single
    /// quotes is ignored either way, so `'replica'` matches `replica`.
    #[must_use]
    pub fn declares(&self, rendered: &str) -> bool {
        let wanted = unquote(rendered.trim());
        self.value().is_some_and(|value| {
            unquote(value) == wanted || unquote(strip_inline_comment(value)) == wanted
        })
    }
}

fn classify(raw: &str) -> LineKind {
    let Some((key, value)) = raw.split_once('=') else {
        return LineKind::Opaque;
    };
    let key = key.trim();
    let value = value.trim().to_string();
    match key.strip_prefix(COMMENT) {
        Some(rest) => LineKind::Commented {
            key: rest.trim().to_string(),
            value,
        },
        None => LineKind::Active {
            key: key.to_string(),
            value,
        },
    }
}

fn strip_inline_comment(value: &str) -> &str {
    let mut quoted = false;
    for (index, character) in value.char_indices() {
        match character {
            QUOTE => quoted = !quoted,
            COMMENT if !quoted => return value[..index].trim_end(),
            _ => {}
        }
    }
    value
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix(QUOTE)
        .and_then(|inner| inner.strip_suffix(QUOTE))
        .unwrap_or(value)
}
