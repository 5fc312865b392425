//! `implant-core`: implant text parsing and record reconciliation.
//!
//! Pure engine crate: receives OCR text and record lists, returns typed
//! records and duplicate decisions. No filesystem or CLI dependencies.

pub mod builder;
pub mod classify;
pub mod compare;
pub mod model;
pub mod resolve;
pub mod search;

pub use builder::{build_record, RecordBuilder};
pub use classify::{classify_line, FieldTag, LineMatch};
pub use model::{CharacterRecord, RecordPatch, SampleNumber};
pub use resolve::{DuplicateChoice, Outcome, Resolution};
pub use search::{search, SearchFields};
