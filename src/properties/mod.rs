//! In-memory properties store and the line-oriented `key=value` format.
//!
//! Every key maps to an ordered list of strings. Scalar accessors read the
//! first element; list accessors read all of them.

pub mod parser;

use std::str::FromStr;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors while parsing properties text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("line {line}: malformed \\u escape: {detail}")]
    InvalidUnicodeEscape { line: usize, detail: String },
}

/// Parsed properties, in first-appearance key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, Vec<String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties text. See [`parser`] for the accepted syntax.
    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        parser::parse_properties(text)
    }

    /// Append values to a key, creating it if needed.
    pub fn append(&mut self, key: impl Into<String>, values: impl IntoIterator<Item = String>) {
        self.entries.entry(key.into()).or_default().extend(values);
    }

    /// All values for a key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The first value for a key.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Properties {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
