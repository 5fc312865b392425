use std::fmt;

use implant_core::resolve::ChoiceRequired;
use implant_core::SampleNumber;

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Filesystem read/write failure.
    Io(String),
    /// JSON encode/decode failure.
    Serialize(String),
    /// No such account in the collection.
    UnknownAccount(String),
    /// Record index outside the account's list.
    IndexOutOfRange { account: String, index: usize, len: usize },
    /// Duplicate sample number with clones allowed and no choice supplied.
    ChoiceRequired { sample_number: SampleNumber, index: usize },
    /// `add_account` on an id that is already present.
    AccountExists(String),
    /// Blank or otherwise unusable account id.
    InvalidAccountId(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Serialize(msg) => write!(f, "serialization error: {msg}"),
            Self::UnknownAccount(id) => write!(f, "unknown account: {id}"),
            Self::IndexOutOfRange { account, index, len } => {
                write!(f, "account '{account}': index {index} out of range (0..{len})")
            }
            Self::ChoiceRequired { sample_number, index } => write!(
                f,
                "sample number {sample_number} already exists at index {index}; choose clone or replace"
            ),
            Self::AccountExists(id) => write!(f, "account already exists: {id}"),
            Self::InvalidAccountId(id) => write!(f, "invalid account id: '{id}'"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialize(e.to_string())
    }
}

impl From<ChoiceRequired> for StoreError {
    fn from(e: ChoiceRequired) -> Self {
        Self::ChoiceRequired {
            sample_number: e.sample_number,
            index: e.index,
        }
    }
}
