use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Placeholder for a value that was never observed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Timestamp format used for `date_added`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The natural key of an implant scan.
///
/// Stored as free text: OCR output is never validated, and batch scans may
/// append a disambiguation suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleNumber(String);

impl SampleNumber {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank key never takes part in duplicate detection.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self(format!("{}{}", self.0, suffix))
    }
}

impl fmt::Display for SampleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SampleNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One parsed implant scan.
///
/// Every core field is always present; a missing key in a persisted document
/// falls back to the field default instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    #[serde(default)]
    pub sample_number: Option<SampleNumber>,
    #[serde(default)]
    pub vernacular_id: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Boss-kill lines in OCR order. Repeats are kept.
    #[serde(default)]
    pub survival_quotient: Vec<String>,
    #[serde(default = "default_chibi_levels")]
    pub chibi_levels: String,
    #[serde(default)]
    pub explorer_notes: Vec<String>,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_clone: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_index: Option<u32>,
}

fn default_chibi_levels() -> String {
    NOT_AVAILABLE.to_string()
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self {
            sample_number: None,
            vernacular_id: None,
            gender: None,
            survival_quotient: Vec::new(),
            chibi_levels: default_chibi_levels(),
            explorer_notes: Vec::new(),
            comments: String::new(),
            background_image: None,
            date_added: String::new(),
            is_clone: None,
            clone_index: None,
        }
    }
}

impl CharacterRecord {
    /// The key used for duplicate detection. Blank sample numbers have no identity.
    pub fn identity(&self) -> Option<&SampleNumber> {
        self.sample_number.as_ref().filter(|s| !s.is_blank())
    }

    pub fn is_clone(&self) -> bool {
        self.is_clone.unwrap_or(false)
    }

    /// Shallow field overwrite. `date_added` is never touched.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(v) = patch.sample_number {
            self.sample_number = v;
        }
        if let Some(v) = patch.vernacular_id {
            self.vernacular_id = v;
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.survival_quotient {
            self.survival_quotient = v;
        }
        if let Some(v) = patch.chibi_levels {
            self.chibi_levels = v;
        }
        if let Some(v) = patch.explorer_notes {
            self.explorer_notes = v;
        }
        if let Some(v) = patch.comments {
            self.comments = v;
        }
        if let Some(v) = patch.background_image {
            self.background_image = v;
        }
        if let Some(v) = patch.is_clone {
            self.is_clone = v;
        }
        if let Some(v) = patch.clone_index {
            self.clone_index = v;
        }
    }

    /// File name of the background image, if any.
    pub fn image_name(&self) -> Option<String> {
        self.background_image
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// One-line listing entry, numbered from 1.
    ///
    /// `3. a.png - Rex (Sample #123, Male) (Clone)`
    pub fn summary_line(&self, index: usize) -> String {
        let file = self.image_name().unwrap_or_else(|| "Unknown".to_string());
        let name = self.vernacular_id.as_deref().unwrap_or(NOT_AVAILABLE);
        let sample = self
            .sample_number
            .as_ref()
            .map(SampleNumber::as_str)
            .unwrap_or(NOT_AVAILABLE);
        let gender = self.gender.as_deref().unwrap_or(NOT_AVAILABLE);
        let clone = if self.is_clone() { " (Clone)" } else { "" };
        format!("{}. {file} - {name} (Sample #{sample}, {gender}){clone}", index + 1)
    }
}

// ---------------------------------------------------------------------------
// Partial update
// ---------------------------------------------------------------------------

/// Optional-field variant of [`CharacterRecord`] used for updates.
///
/// `None` leaves the field alone; `Some(v)` overwrites it. Nullable fields
/// nest a second `Option` so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub sample_number: Option<Option<SampleNumber>>,
    pub vernacular_id: Option<Option<String>>,
    pub gender: Option<Option<String>>,
    pub survival_quotient: Option<Vec<String>>,
    pub chibi_levels: Option<String>,
    pub explorer_notes: Option<Vec<String>>,
    pub comments: Option<String>,
    pub background_image: Option<Option<String>>,
    pub is_clone: Option<Option<bool>>,
    pub clone_index: Option<Option<u32>>,
}

impl RecordPatch {
    pub fn comments(text: impl Into<String>) -> Self {
        Self {
            comments: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn background_image(path: impl Into<String>) -> Self {
        Self {
            background_image: Some(Some(path.into())),
            ..Self::default()
        }
    }
}
