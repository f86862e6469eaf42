//! `RWD_PART` section extraction.
//!
//! # Wire Format
//! ```text
//! <!--[RWD_PART:{name}]-->{body}<!--[/RWD_PART:{name}]-->
//! ```
//!
//! # Design Decisions
//! - Content outside of sections is discarded
//! - A top-level pass jumps from each closing marker to the next opener,
//!   so markers nested inside a body are only picked up by the nested pass
//! - Nested sections never overwrite a name that is already in the table
//! - A missing `]-->` or closing marker fails the whole parse

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Opening marker prefix.
pub const OPEN_MARKER: &str = "<!--[RWD_PART:";

/// Terminates a section name inside the opening marker.
pub const NAME_TERMINATOR: &str = "]-->";

/// Upper bound on nested re-parsing passes.
const MAX_NESTING_DEPTH: usize = 8;

/// Errors raised while scanning section markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    /// An opening marker without its `]-->` terminator.
    #[error("unterminated section name at byte {offset}")]
    UnterminatedName { offset: usize },

    /// A section that is never closed.
    #[error("missing closing marker for section '{name}'")]
    MissingClose { name: String },
}

/// Ordered mapping of section name to body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    entries: Vec<(String, String)>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a section. A replaced section keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        let name = name.into();
        let body = body.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = body,
            None => self.entries.push((name, body)),
        }
    }

    /// Insert only when `name` is not present yet. Returns whether it was added.
    pub fn insert_if_absent(&mut self, name: &str, body: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), body.to_string()));
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Section names in first-seen order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, b)| (n.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Serialize for SectionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, body) in &self.entries {
            map.serialize_entry(name, body)?;
        }
        map.end()
    }
}

/// Closing marker for the section `name`.
pub fn closing_marker(name: &str) -> String {
    format!("<!--[/RWD_PART:{}]-->", name)
}

/// Extract the top-level sections of `content`.
///
/// Only one body is extracted per opening marker; whatever follows its
/// closing marker up to the next opener is dropped.
pub fn parse_sections(content: &str) -> Result<SectionTable, SectionError> {
    let mut table = SectionTable::new();
    let mut cursor = 0;

    while let Some(found) = content[cursor..].find(OPEN_MARKER) {
        let name_start = cursor + found + OPEN_MARKER.len();
        let name_len = content[name_start..]
            .find(NAME_TERMINATOR)
            .ok_or(SectionError::UnterminatedName { offset: cursor + found })?;
        let name = &content[name_start..name_start + name_len];

        let body_start = name_start + name_len + NAME_TERMINATOR.len();
        let close = closing_marker(name);
        let body_len = content[body_start..]
            .find(&close)
            .ok_or_else(|| SectionError::MissingClose { name: name.to_string() })?;

        table.insert(name, &content[body_start..body_start + body_len]);
        cursor = body_start + body_len + close.len();
    }

    Ok(table)
}

/// Parse `content` and merge sections found inside section bodies.
///
/// Outer bodies are left untouched; nested names only fill gaps in the table.
/// A malformed nested body contributes nothing.
pub fn parse_with_nested(content: &str) -> Result<SectionTable, SectionError> {
    let mut table = parse_sections(content)?;

    let mut pending: Vec<String> = table.iter().map(|(_, body)| body.to_string()).collect();
    let mut depth = 0;
    while !pending.is_empty() && depth < MAX_NESTING_DEPTH {
        let mut next = Vec::new();
        for body in &pending {
            let nested = match parse_sections(body) {
                Ok(nested) => nested,
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring malformed nested section");
                    continue;
                }
            };
            for (name, nested_body) in nested.iter() {
                if table.insert_if_absent(name, nested_body) {
                    next.push(nested_body.to_string());
                }
            }
        }
        pending = next;
        depth += 1;
    }

    Ok(table)
}
