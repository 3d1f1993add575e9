//! Typed, string-keyed extension maps for per-tenant custom fields.
//!
//! Tenants attach free-form metadata (amenities, guest preferences, channel
//! references) to rooms and stays. Values are typed and keys are validated
//! when the map is built, so nothing dynamically typed reaches core logic.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entries in one map.
pub const MAX_ENTRIES: usize = 32;
/// Maximum key length in bytes.
pub const MAX_KEY_LEN: usize = 64;
/// Maximum length of a text value (or of each list item).
pub const MAX_TEXT_LEN: usize = 1024;

/// A single extension value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ExtensionValue {
    /// Free text.
    Text(String),
    /// Decimal number.
    Number(Decimal),
    /// Boolean flag.
    Flag(bool),
    /// List of short strings.
    List(Vec<String>),
}

/// Errors raised while validating an extension map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// Too many entries.
    #[error("extension map has {0} entries, at most {MAX_ENTRIES} allowed")]
    TooManyEntries(usize),

    /// Key is empty, too long or has characters outside `[a-z0-9_.-]`.
    #[error("invalid extension key: {0:?}")]
    InvalidKey(String),

    /// A text value (or list item) is too long.
    #[error("extension value for {0:?} is too long")]
    ValueTooLong(String),
}

/// A validated extension map. Iteration order is by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, ExtensionValue>", into = "BTreeMap<String, ExtensionValue>")]
pub struct ExtensionMap(BTreeMap<String, ExtensionValue>);

impl ExtensionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and wraps raw entries.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError` on the first rule violation.
    pub fn from_entries(entries: BTreeMap<String, ExtensionValue>) -> Result<Self, ExtensionError> {
        if entries.len() > MAX_ENTRIES {
            return Err(ExtensionError::TooManyEntries(entries.len()));
        }
        for (key, value) in &entries {
            validate_key(key)?;
            validate_value(key, value)?;
        }
        Ok(Self(entries))
    }

    /// Inserts one entry, validating it against the same rules.
    ///
    /// # Errors
    ///
    /// Returns `ExtensionError` if the key, the value or the resulting size is invalid.
    pub fn insert(&mut self, key: impl Into<String>, value: ExtensionValue) -> Result<(), ExtensionError> {
        let key = key.into();
        validate_key(&key)?;
        validate_value(&key, &value)?;
        if !self.0.contains_key(&key) && self.0.len() >= MAX_ENTRIES {
            return Err(ExtensionError::TooManyEntries(self.0.len() + 1));
        }
        self.0.insert(key, value);
        Ok(())
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExtensionValue> {
        self.0.get(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExtensionValue)> {
        self.0.iter()
    }
}

impl TryFrom<BTreeMap<String, ExtensionValue>> for ExtensionMap {
    type Error = ExtensionError;

    fn try_from(entries: BTreeMap<String, ExtensionValue>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<ExtensionMap> for BTreeMap<String, ExtensionValue> {
    fn from(map: ExtensionMap) -> Self {
        map.0
    }
}

fn validate_key(key: &str) -> Result<(), ExtensionError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'_' | b'.' | b'-'));
    if valid {
        Ok(())
    } else {
        Err(ExtensionError::InvalidKey(key.to_string()))
    }
}

fn validate_value(key: &str, value: &ExtensionValue) -> Result<(), ExtensionError> {
    let too_long = match value {
        ExtensionValue::Text(text) => text.len() > MAX_TEXT_LEN,
        ExtensionValue::List(items) => items.iter().any(|i| i.len() > MAX_TEXT_LEN),
        ExtensionValue::Number(_) | ExtensionValue::Flag(_) => false,
    };
    if too_long {
        Err(ExtensionError::ValueTooLong(key.to_string()))
    } else {
        Ok(())
    }
}
