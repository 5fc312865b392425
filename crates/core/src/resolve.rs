//! Duplicate resolution by sample number.
//!
//! The single authority for collision policy:
//! - interactive insert: new / replace / clone (the caller picks between
//!   replace and clone when clones are allowed),
//! - non-interactive directory scans: skip already-imported keys and suffix
//!   keys that collide within the same scan.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::model::{CharacterRecord, SampleNumber};

/// Suffix appended to a sample number colliding within one directory scan.
pub const CLONE_SUFFIX: &str = "_clone";

// ---------------------------------------------------------------------------
// Interactive insert
// ---------------------------------------------------------------------------

/// Caller's answer when a duplicate is found and clones are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateChoice {
    Replace,
    Clone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No identity, or no record shares it.
    New,
    /// Overwrite the record at `index`.
    Replace { index: usize },
    /// A record at `index` shares the key; the caller must choose.
    Choose { index: usize },
}

/// What [`commit`] did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Appended { index: usize },
    Replaced { index: usize },
    Cloned { index: usize, clone_index: u32 },
}

impl Outcome {
    pub fn index(&self) -> usize {
        match *self {
            Self::Appended { index } | Self::Replaced { index } | Self::Cloned { index, .. } => index,
        }
    }
}

/// A duplicate was found with clones allowed and no choice was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRequired {
    pub sample_number: SampleNumber,
    pub index: usize,
}

impl fmt::Display for ChoiceRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sample number {} already exists at index {}; choose clone or replace",
            self.sample_number, self.index
        )
    }
}

impl std::error::Error for ChoiceRequired {}

/// Index of the first record sharing `sample`.
pub fn find_match(sample: &SampleNumber, existing: &[CharacterRecord]) -> Option<usize> {
    existing.iter().position(|r| r.identity() == Some(sample))
}

pub fn resolve(candidate: &CharacterRecord, existing: &[CharacterRecord], allow_clones: bool) -> Resolution {
    let Some(sample) = candidate.identity() else {
        return Resolution::New;
    };
    match find_match(sample, existing) {
        None => Resolution::New,
        Some(index) if allow_clones => Resolution::Choose { index },
        Some(index) => Resolution::Replace { index },
    }
}

/// Existing clones of `sample` plus one.
pub fn next_clone_index(sample: &SampleNumber, existing: &[CharacterRecord]) -> u32 {
    let clones = existing
        .iter()
        .filter(|r| r.identity() == Some(sample) && r.is_clone())
        .count();
    clones as u32 + 1
}

/// Mark `record` as the next clone of its sample number. Returns the clone index.
pub fn mark_clone(record: &mut CharacterRecord, existing: &[CharacterRecord]) -> u32 {
    let clone_index = match record.identity() {
        Some(sample) => next_clone_index(sample, existing),
        None => 1,
    };
    record.is_clone = Some(true);
    record.clone_index = Some(clone_index);
    clone_index
}

/// Resolve `candidate` against `records` and apply the decision.
///
/// `choice` is consulted only when a duplicate is found with clones allowed.
/// With clones disabled a duplicate is always replaced. Replacement swaps in
/// the candidate whole; nothing of the old record survives.
pub fn commit(
    records: &mut Vec<CharacterRecord>,
    mut candidate: CharacterRecord,
    allow_clones: bool,
    choice: Option<DuplicateChoice>,
) -> Result<Outcome, ChoiceRequired> {
    let resolution = resolve(&candidate, records, allow_clones);
    let outcome = match (resolution, choice) {
        (Resolution::New, _) => {
            records.push(candidate);
            Outcome::Appended { index: records.len() - 1 }
        }
        (Resolution::Replace { index }, _) | (Resolution::Choose { index }, Some(DuplicateChoice::Replace)) => {
            records[index] = candidate;
            Outcome::Replaced { index }
        }
        (Resolution::Choose { .. }, Some(DuplicateChoice::Clone)) => {
            let clone_index = mark_clone(&mut candidate, records);
            records.push(candidate);
            Outcome::Cloned {
                index: records.len() - 1,
                clone_index,
            }
        }
        (Resolution::Choose { index }, None) => {
            let sample_number = records[index]
                .sample_number
                .clone()
                .unwrap_or_else(|| SampleNumber::new(""));
            return Err(ChoiceRequired { sample_number, index });
        }
    };
    debug!(?outcome, "candidate committed");
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// Directory scan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BatchDecision {
    /// Insert the record; its sample number may carry [`CLONE_SUFFIX`].
    Insert(CharacterRecord),
    /// No sample number was read.
    SkipNoIdentity,
    /// The key was already in the account before the scan started.
    SkipKnown(SampleNumber),
}

/// Non-interactive duplicate handling for one account during a directory scan.
///
/// Keys present before the scan mean the image was already imported. Keys
/// inserted earlier in the same scan are disambiguated by suffixing, checked
/// against the live list so repeated collisions stack (`7`, `7_clone`,
/// `7_clone_clone`). Never sets clone markers.
#[derive(Debug, Clone, Default)]
pub struct BatchDisambiguator {
    known: HashSet<SampleNumber>,
}

impl BatchDisambiguator {
    pub fn new(existing: &[CharacterRecord]) -> Self {
        Self {
            known: existing.iter().filter_map(|r| r.identity().cloned()).collect(),
        }
    }

    pub fn admit(&self, mut candidate: CharacterRecord, live: &[CharacterRecord]) -> BatchDecision {
        let Some(sample) = candidate.identity().cloned() else {
            return BatchDecision::SkipNoIdentity;
        };
        if self.known.contains(&sample) {
            return BatchDecision::SkipKnown(sample);
        }

        let mut key = sample;
        while find_match(&key, live).is_some() {
            key = key.with_suffix(CLONE_SUFFIX);
        }
        candidate.sample_number = Some(key);
        BatchDecision::Insert(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sample: &str, name: &str) -> CharacterRecord {
        CharacterRecord {
            sample_number: Some(sample.into()),
            vernacular_id: Some(name.into()),
            ..CharacterRecord::default()
        }
    }

    #[test]
    fn missing_identity_is_always_new() {
        let existing = vec![CharacterRecord::default()];
        let candidate = CharacterRecord::default();
        assert_eq!(resolve(&candidate, &existing, false), Resolution::New);

        let mut blank = CharacterRecord::default();
        blank.sample_number = Some("".into());
        assert_eq!(resolve(&blank, &existing, true), Resolution::New);
    }

    #[test]
    fn unknown_key_is_new() {
        let mut list = vec![rec("1", "a")];
        let out = commit(&mut list, rec("100", "b"), true, None).unwrap();
        assert_eq!(out, Outcome::Appended { index: 1 });
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn duplicate_without_clone_support_replaces() {
        let mut list = vec![rec("100", "old"), rec("2", "other")];
        list[0].comments = "old note".into();

        let out = commit(&mut list, rec("100", "new"), false, None).unwrap();
        assert_eq!(out, Outcome::Replaced { index: 0 });
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].vernacular_id.as_deref(), Some("new"));
        assert_eq!(list[0].comments, "");
    }

    #[test]
    fn duplicate_with_clone_support_needs_a_choice() {
        let mut list = vec![rec("100", "orig")];
        let err = commit(&mut list, rec("100", "dup"), true, None).unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.sample_number, SampleNumber::from("100"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn clone_indices_increment() {
        let mut list = vec![rec("100", "orig")];
        let original = list[0].clone();

        let first = commit(&mut list, rec("100", "c1"), true, Some(DuplicateChoice::Clone)).unwrap();
        assert_eq!(first, Outcome::Cloned { index: 1, clone_index: 1 });
        assert_eq!(list[1].is_clone, Some(true));
        assert_eq!(list[1].clone_index, Some(1));

        let second = commit(&mut list, rec("100", "c2"), true, Some(DuplicateChoice::Clone)).unwrap();
        assert_eq!(second, Outcome::Cloned { index: 2, clone_index: 2 });
        assert_eq!(list[2].clone_index, Some(2));

        assert_eq!(list[0], original);
    }

    #[test]
    fn replace_choice_overwrites_in_place() {
        let mut list = vec![rec("100", "orig"), rec("5", "x")];
        let out = commit(&mut list, rec("100", "fresh"), true, Some(DuplicateChoice::Replace)).unwrap();
        assert_eq!(out, Outcome::Replaced { index: 0 });
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].vernacular_id.as_deref(), Some("fresh"));
    }

    #[test]
    fn clone_choice_is_ignored_when_clones_disabled() {
        let mut list = vec![rec("100", "orig")];
        let out = commit(&mut list, rec("100", "fresh"), false, Some(DuplicateChoice::Clone)).unwrap();
        assert_eq!(out, Outcome::Replaced { index: 0 });
        assert_eq!(list[0].is_clone, None);
    }

    #[test]
    fn clone_index_counts_only_marked_clones() {
        let list = vec![rec("100", "a"), rec("100", "b"), rec("7", "c")];
        assert_eq!(next_clone_index(&"100".into(), &list), 1);

        let mut marked = rec("100", "d");
        mark_clone(&mut marked, &list);
        let mut list = list;
        list.push(marked);
        assert_eq!(next_clone_index(&"100".into(), &list), 2);
    }

    #[test]
    fn batch_suffixes_in_scan_collisions() {
        let mut live: Vec<CharacterRecord> = Vec::new();
        let batch = BatchDisambiguator::new(&live);

        for name in ["a", "b", "c"] {
            match batch.admit(rec("7", name), &live) {
                BatchDecision::Insert(r) => live.push(r),
                other => panic!("unexpected {other:?}"),
            }
        }

        let keys: Vec<&str> = live
            .iter()
            .map(|r| r.sample_number.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(keys, vec!["7", "7_clone", "7_clone_clone"]);
        assert!(live.iter().all(|r| r.is_clone.is_none() && r.clone_index.is_none()));
    }

    #[test]
    fn batch_skips_known_and_unkeyed() {
        let live = vec![rec("7", "old")];
        let batch = BatchDisambiguator::new(&live);
        assert_eq!(batch.admit(rec("7", "again"), &live), BatchDecision::SkipKnown("7".into()));
        assert_eq!(
            batch.admit(CharacterRecord::default(), &live),
            BatchDecision::SkipNoIdentity
        );
    }

    #[test]
    fn batch_suffix_avoids_existing_suffixed_key() {
        // "7_clone" survives from an older scan; "7" itself was deleted since.
        let mut live = vec![rec("7_clone", "older")];
        let batch = BatchDisambiguator::new(&live);

        let first = batch.admit(rec("7", "a"), &live);
        let BatchDecision::Insert(first) = first else { panic!("expected insert") };
        assert_eq!(first.sample_number, Some(SampleNumber::from("7")));
        live.push(first);

        let BatchDecision::Insert(second) = batch.admit(rec("7", "b"), &live) else {
            panic!("expected insert")
        };
        assert_eq!(second.sample_number, Some(SampleNumber::from("7_clone_clone")));
    }
}
