use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FormgenError, GenerateError};

/// Supplies the label text and item lists that definition files reference
/// through field-data keys. The generator receives an implementation at
/// construction; it never reaches for ambient state.
pub trait FieldData {
    /// Label text for a field-data key.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnknownFieldData`] for an unknown key.
    fn label(&self, key: &str) -> Result<&str, GenerateError>;

    /// Item list for a field-data key (selection fields).
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::UnknownFieldData`] for an unknown key.
    fn items(&self, key: &str) -> Result<&[String], GenerateError>;
}

/// One field-data record: a label plus an optional item list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub label: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// In-memory [`FieldData`] backed by a plain map. Entries are inserted
/// directly or loaded from a JSON file mapping keys to records.
#[derive(Debug, Default)]
pub struct StaticFieldData {
    entries: HashMap<String, FieldEntry>,
}

impl StaticFieldData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: FieldEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Convenience for label-only entries.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert(
            key,
            FieldEntry {
                label: label.into(),
                items: Vec::new(),
            },
        );
        self
    }

    /// Load entries from a JSON object mapping keys to records.
    ///
    /// # Errors
    ///
    /// Returns [`FormgenError`] on I/O failure or invalid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FormgenError> {
        let raw = fs::read_to_string(path)?;
        let entries: HashMap<String, FieldEntry> = serde_json::from_str(&raw)?;
        Ok(Self { entries })
    }
}

impl FieldData for StaticFieldData {
    fn label(&self, key: &str) -> Result<&str, GenerateError> {
        self.entries
            .get(key)
            .map(|e| e.label.as_str())
            .ok_or_else(|| GenerateError::UnknownFieldData {
                key: key.to_owned(),
            })
    }

    fn items(&self, key: &str) -> Result<&[String], GenerateError> {
        self.entries
            .get(key)
            .map(|e| e.items.as_slice())
            .ok_or_else(|| GenerateError::UnknownFieldData {
                key: key.to_owned(),
            })
    }
}
