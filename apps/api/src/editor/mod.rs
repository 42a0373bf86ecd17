// Form editor: editable form state seeded from a ResumeDocument.
// Edits touch only the form; a new document exists only after `submit`.

pub mod handlers;
pub mod photo;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::{normalize, ResumeDocument, SectionKey};

pub use photo::{read_photo, PhotoError, PhotoLimits, PhotoSource};

/// Editable fields of `personalInformation`, in form order.
pub const PERSONAL_FIELDS: [&str; 8] = [
    "fullName",
    "email",
    "phoneNumber",
    "location",
    "gitHub",
    "linkedIn",
    "portfolio",
    "profilePhoto",
];

const PERSONAL: &str = "personalInformation";
const SUMMARY: &str = "summary";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("{section} has no entry at index {index} (length {len})")]
    IndexOutOfRange {
        section: SectionKey,
        index: usize,
        len: usize,
    },

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{0}' is not a repeatable section")]
    NotRepeatable(String),
}

/// Parses a repeatable section name.
pub fn parse_section(name: &str) -> Result<SectionKey, EditorError> {
    if name == PERSONAL || name == SUMMARY {
        return Err(EditorError::NotRepeatable(name.to_string()));
    }
    name.parse::<SectionKey>()
        .map_err(|_| EditorError::UnknownSection(name.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Field paths
// ────────────────────────────────────────────────────────────────────────────

/// Address of one editable value: `personalInformation.<field>`, `summary`,
/// or `<section>.<index>.<field>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPath {
    Personal(&'static str),
    Summary,
    Entry {
        section: SectionKey,
        index: usize,
        field: &'static str,
    },
}

impl FromStr for FormPath {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || EditorError::UnknownField(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [SUMMARY] => Ok(FormPath::Summary),
            [PERSONAL, field] => PERSONAL_FIELDS
                .iter()
                .copied()
                .find(|f| f == field)
                .map(FormPath::Personal)
                .ok_or_else(unknown),
            [section, index, field] => {
                let section = parse_section(section)?;
                let index = index.parse::<usize>().map_err(|_| unknown())?;
                let field = section
                    .fields()
                    .iter()
                    .copied()
                    .find(|f| f == field)
                    .ok_or_else(unknown)?;
                Ok(FormPath::Entry {
                    section,
                    index,
                    field,
                })
            }
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for FormPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormPath::Personal(field) => write!(f, "{PERSONAL}.{field}"),
            FormPath::Summary => f.write_str(SUMMARY),
            FormPath::Entry {
                section,
                index,
                field,
            } => write!(f, "{section}.{index}.{field}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Editor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FormEditor {
    personal: Map<String, Value>,
    summary: Value,
    sections: HashMap<SectionKey, Vec<Value>>,
}

impl FormEditor {
    /// Seeds the form from a document. Bare-string entries become full entries
    /// with the string in their label field, and every empty repeatable section
    /// gets exactly one blank entry.
    pub fn seed(document: &ResumeDocument) -> Self {
        let mut raw = match serde_json::to_value(document) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let mut personal = match raw.remove(PERSONAL) {
            Some(Value::Object(info)) => info,
            _ => Map::new(),
        };
        for field in PERSONAL_FIELDS {
            personal.entry(field).or_insert_with(|| json!(""));
        }

        let sections = SectionKey::ALL
            .into_iter()
            .map(|key| {
                let mut entries: Vec<Value> = match raw.remove(key.as_str()) {
                    Some(Value::Array(items)) => {
                        items.into_iter().map(|v| expand_entry(key, v)).collect()
                    }
                    _ => Vec::new(),
                };
                if entries.is_empty() {
                    entries.push(key.blank_entry());
                }
                (key, entries)
            })
            .collect();

        Self {
            personal,
            summary: raw.remove(SUMMARY).unwrap_or_else(|| json!("")),
            sections,
        }
    }

    /// Current form state, as sent to and edited by the client.
    pub fn form(&self) -> Value {
        let mut form = Map::new();
        form.insert(PERSONAL.to_string(), Value::Object(self.personal.clone()));
        form.insert(SUMMARY.to_string(), self.summary.clone());
        for key in SectionKey::ALL {
            form.insert(key.as_str().to_string(), Value::Array(self.entries(key).to_vec()));
        }
        Value::Object(form)
    }

    pub fn entries(&self, key: SectionKey) -> &[Value] {
        self.sections.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends `template` (normally `key.blank_entry()`); returns the new index.
    pub fn append(&mut self, key: SectionKey, template: Value) -> usize {
        let items = self.sections.entry(key).or_default();
        items.push(expand_entry(key, template));
        items.len() - 1
    }

    /// Removes and returns the entry at `index`.
    pub fn remove(&mut self, key: SectionKey, index: usize) -> Result<Value, EditorError> {
        let items = self.sections.entry(key).or_default();
        if index >= items.len() {
            return Err(EditorError::IndexOutOfRange {
                section: key,
                index,
                len: items.len(),
            });
        }
        Ok(items.remove(index))
    }

    pub fn set_field(&mut self, path: &FormPath, value: Value) -> Result<(), EditorError> {
        match *path {
            FormPath::Summary => self.summary = value,
            FormPath::Personal(field) => {
                self.personal.insert(field.to_string(), value);
            }
            FormPath::Entry {
                section,
                index,
                field,
            } => {
                let items = self.sections.entry(section).or_default();
                let len = items.len();
                match items.get_mut(index) {
                    Some(Value::Object(entry)) => {
                        entry.insert(field.to_string(), value);
                    }
                    Some(other) => *other = expand_entry(section, json!({ field: value })),
                    None => {
                        return Err(EditorError::IndexOutOfRange {
                            section,
                            index,
                            len,
                        })
                    }
                }
            }
        }
        Ok(())
    }

    pub fn set_profile_photo(&mut self, data_url: String) {
        self.personal
            .insert("profilePhoto".to_string(), Value::String(data_url));
    }

    pub fn profile_photo(&self) -> &str {
        self.personal
            .get("profilePhoto")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Normalizes the form into a new document. Blank entries are kept.
    pub fn submit(&self) -> ResumeDocument {
        normalize(&self.form())
    }
}

/// An object entry with every field of `key` present. Bare scalars fill the label field.
fn expand_entry(key: SectionKey, raw: Value) -> Value {
    let mut entry = match key.blank_entry() {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    match raw {
        Value::Object(fields) => {
            for (k, v) in fields {
                if key.fields().contains(&k.as_str()) {
                    entry.insert(k, v);
                }
            }
        }
        Value::String(s) => {
            entry.insert(key.label_field().to_string(), Value::String(s));
        }
        Value::Number(_) | Value::Bool(_) => {
            entry.insert(key.label_field().to_string(), Value::String(raw.to_string()));
        }
        _ => {}
    }
    Value::Object(entry)
}
