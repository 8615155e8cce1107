//! Field-priority text extraction.
//!
//! A complaint can carry its descriptive text in one of several fields
//! depending on which intake form produced it, with at most one populated.
//! The priority order is configuration, not inline branching, so it can be
//! tested and overridden independently.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::Complaint;

/// Built-in field order, matching the intake forms' precedence.
const DEFAULT_FIELDS: &[&str] = &[
    "concernDescription",
    "incidentDescription",
    "facilityDescription",
    "concernFeedback",
    "otherDescription",
    "additionalContext",
    "additionalNotes",
    "impactExperience",
    "facilitySafety",
];

/// Snippet length for triage queue entries.
pub const SNIPPET_LEN: usize = 120;

/// Ordered list of text-bearing fields, evaluated first-match-wins.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionProfile {
    pub fields: Vec<String>,
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self {
            fields: DEFAULT_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractionProfile {
    /// Load a profile from a TOML file (`fields = ["...", ...]`).
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read profile {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("bad profile {}: {e}", path.display())))
    }

    /// Extract the complaint's descriptive text: the first non-empty value
    /// among the profile's fields, or `""` when none is present.
    pub fn extract<'a>(&self, complaint: &'a Complaint) -> &'a str {
        for field in &self.fields {
            if let Some(text) = complaint.details.get(field).and_then(|v| v.as_str())
                && !text.is_empty()
            {
                return text;
            }
        }
        ""
    }

    /// Extracted text truncated to the queue snippet length.
    pub fn snippet(&self, complaint: &Complaint) -> String {
        self.extract(complaint).chars().take(SNIPPET_LEN).collect()
    }
}
