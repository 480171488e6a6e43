//! Raw name text → `IdentityKey`.
//!
//! One strategy per source layout. Every strategy ends in the same
//! canonical form: uppercased, trimmed, internal whitespace collapsed.

use serde::{Deserialize, Serialize};

use crate::error::RowError;
use crate::model::IdentityKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameFormat {
    /// `"Last, First123..."`; the first digit run ends the first name.
    CommaLastFirst,
    /// `"First Last Last..."`; first token is the first name.
    FirstLast,
    /// Comma present → comma layout without digit truncation, else `FirstLast`.
    Auto,
}

/// Normalize `raw` under `format`.
pub fn normalize(raw: &str, format: NameFormat) -> Result<IdentityKey, RowError> {
    if raw.trim().is_empty() {
        return Err(invalid(raw));
    }

    match format {
        NameFormat::CommaLastFirst => split_comma(raw, true),
        NameFormat::FirstLast => split_first_last(raw),
        NameFormat::Auto if raw.contains(',') => split_comma(raw, false),
        NameFormat::Auto => split_first_last(raw),
    }
}

impl IdentityKey {
    /// Key from two already-split cells (`last`, `first`).
    pub fn from_parts(last: &str, first: &str) -> Result<Self, RowError> {
        let key = IdentityKey {
            last: canonical(last),
            first: canonical(first),
        };
        if key.last.is_empty() || key.first.is_empty() {
            return Err(invalid(&format!("{last}, {first}")));
        }
        Ok(key)
    }
}

fn split_comma(raw: &str, truncate_at_digits: bool) -> Result<IdentityKey, RowError> {
    let (last, rest) = raw.split_once(',').ok_or_else(|| invalid(raw))?;
    let first = if truncate_at_digits {
        rest.find(|c: char| c.is_ascii_digit())
            .map_or(rest, |end| &rest[..end])
    } else {
        rest
    };
    IdentityKey::from_parts(last, first).map_err(|_| invalid(raw))
}

fn split_first_last(raw: &str) -> Result<IdentityKey, RowError> {
    let mut tokens = raw.split_whitespace();
    let first = tokens.next().ok_or_else(|| invalid(raw))?;
    let last = tokens.collect::<Vec<_>>().join(" ");
    IdentityKey::from_parts(&last, first).map_err(|_| invalid(raw))
}

fn canonical(part: &str) -> String {
    part.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn invalid(raw: &str) -> RowError {
    RowError::InvalidName { raw: raw.to_string() }
}
