//! The character store: an account-keyed collection persisted as one JSON
//! document.
//!
//! Every mutating method writes the whole collection back before returning
//! `Ok`. The only exception is [`Store::scan_directory`](crate::scan), which
//! writes once at the end of the batch. When that write fails the in-memory
//! collection is put back as it was, so an `Err` never leaves a change behind.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use implant_core::builder::now_stamp;
use implant_core::resolve::{self, DuplicateChoice, Outcome, Resolution};
use implant_core::{CharacterRecord, RecordPatch};

use crate::error::StoreError;

/// Account id -> records, in first-insertion order.
pub type AccountCollection = IndexMap<String, Vec<CharacterRecord>>;

pub const DATA_FILE_NAME: &str = "characters.json";
pub const IMPLANTS_DIR: &str = "implants";

#[derive(Debug)]
pub struct Store {
    base_directory: PathBuf,
    data_file: PathBuf,
    accounts: AccountCollection,
}

impl Store {
    /// Open the store under `base_directory`, creating it if needed.
    ///
    /// `data_file` defaults to `<base_directory>/characters.json`.
    pub fn open(base_directory: impl Into<PathBuf>, data_file: Option<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(base_directory.into(), data_file, false)
    }

    /// Like [`Store::open`] but deletes the backing file first.
    pub fn open_reset(base_directory: impl Into<PathBuf>, data_file: Option<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(base_directory.into(), data_file, true)
    }

    fn open_with(base_directory: PathBuf, data_file: Option<PathBuf>, reset: bool) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_directory)?;
        let data_file = data_file.unwrap_or_else(|| base_directory.join(DATA_FILE_NAME));

        if reset && data_file.exists() {
            fs::remove_file(&data_file)?;
            info!(path = %data_file.display(), "character data reset");
        }

        let accounts = load_all(&data_file)?;
        debug!(
            path = %data_file.display(),
            accounts = accounts.len(),
            "character store opened"
        );
        Ok(Self {
            base_directory,
            data_file,
            accounts,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn accounts(&self) -> &AccountCollection {
        &self.accounts
    }

    /// Account ids in order of first appearance.
    pub fn get_all_account_ids(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    pub fn records(&self, account: &str) -> Result<&[CharacterRecord], StoreError> {
        self.accounts
            .get(account)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownAccount(account.to_string()))
    }

    pub fn get_character(&self, account: &str, index: usize) -> Result<&CharacterRecord, StoreError> {
        let records = self.records(account)?;
        records.get(index).ok_or_else(|| StoreError::IndexOutOfRange {
            account: account.to_string(),
            index,
            len: records.len(),
        })
    }

    /// `<base>/<account>/implants`
    pub fn implants_dir(&self, account: &str) -> PathBuf {
        self.base_directory.join(account).join(IMPLANTS_DIR)
    }

    /// Write the whole collection to the data file.
    pub fn persist_all(&self) -> Result<(), StoreError> {
        write_collection(&self.data_file, &self.accounts)
    }

    /// Copy of the collection to hand back to [`Store::persist_or_restore`].
    pub(crate) fn snapshot(&self) -> AccountCollection {
        self.accounts.clone()
    }

    /// Persist, or roll the collection back to `snapshot` if the write fails.
    pub(crate) fn persist_or_restore(&mut self, snapshot: AccountCollection) -> Result<(), StoreError> {
        match self.persist_all() {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(path = %self.data_file.display(), error = %e, "write failed, change rolled back");
                self.accounts = snapshot;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    pub fn add_account(&mut self, id: &str) -> Result<(), StoreError> {
        let id = validate_account_id(id)?;
        if self.accounts.contains_key(id) {
            return Err(StoreError::AccountExists(id.to_string()));
        }
        let snapshot = self.snapshot();
        self.ensure_account(id)?;
        self.persist_or_restore(snapshot)?;
        info!(account = %id, "account added");
        Ok(())
    }

    /// Get or create the account's list and its folder layout. Does not persist.
    pub(crate) fn ensure_account(&mut self, id: &str) -> Result<&mut Vec<CharacterRecord>, StoreError> {
        let id = validate_account_id(id)?;
        fs::create_dir_all(self.implants_dir(id))?;
        Ok(self.accounts.entry(id.to_string()).or_default())
    }

    fn records_mut(&mut self, account: &str) -> Result<&mut Vec<CharacterRecord>, StoreError> {
        self.accounts
            .get_mut(account)
            .ok_or_else(|| StoreError::UnknownAccount(account.to_string()))
    }

    fn check_index(&self, account: &str, index: usize) -> Result<(), StoreError> {
        self.get_character(account, index).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Append `record` to `account` and persist.
    ///
    /// With `image`, the file is copied into the account's implants folder and
    /// the record points at the copy. A failed copy keeps the record.
    pub fn add_character(
        &mut self,
        account: &str,
        mut record: CharacterRecord,
        image: Option<&Path>,
    ) -> Result<&CharacterRecord, StoreError> {
        let account = validate_account_id(account)?;
        let snapshot = self.snapshot();
        self.ensure_account(account)?;
        self.prepare(account, &mut record, image);

        let records = self.records_mut(account)?;
        records.push(record);
        let index = records.len() - 1;
        self.persist_or_restore(snapshot)?;
        info!(account = %account, index, "character added");
        self.get_character(account, index)
    }

    /// Insert a freshly parsed candidate, applying duplicate resolution.
    ///
    /// Fails with [`StoreError::ChoiceRequired`] before touching anything when
    /// the sample number exists, clones are allowed and `choice` is `None`.
    pub fn insert_candidate(
        &mut self,
        account: &str,
        mut candidate: CharacterRecord,
        image: Option<&Path>,
        allow_clones: bool,
        choice: Option<DuplicateChoice>,
    ) -> Result<Outcome, StoreError> {
        let account = validate_account_id(account)?;
        let existing = self.accounts.get(account).map(Vec::as_slice).unwrap_or(&[]);
        if let (Resolution::Choose { index }, None) = (resolve::resolve(&candidate, existing, allow_clones), choice) {
            let sample_number = existing[index].sample_number.clone().unwrap_or_default();
            return Err(StoreError::ChoiceRequired { sample_number, index });
        }

        let snapshot = self.snapshot();
        self.ensure_account(account)?;
        self.prepare(account, &mut candidate, image);
        let outcome = match resolve::commit(self.records_mut(account)?, candidate, allow_clones, choice) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.accounts = snapshot;
                return Err(e.into());
            }
        };
        self.persist_or_restore(snapshot)?;
        info!(account = %account, index = outcome.index(), ?outcome, "candidate stored");
        Ok(outcome)
    }

    fn prepare(&self, account: &str, record: &mut CharacterRecord, image: Option<&Path>) {
        if let Some(source) = image {
            match self.copy_into_implants(account, source) {
                Some(dest) => record.background_image = Some(dest.to_string_lossy().into_owned()),
                None if record.background_image.is_none() => {
                    record.background_image = Some(source.to_string_lossy().into_owned());
                }
                None => {}
            }
        }
        if record.date_added.is_empty() {
            record.date_added = now_stamp();
        }
    }

    /// Shallow-merge `patch` into the record at `index` and persist.
    pub fn update_character(
        &mut self,
        account: &str,
        index: usize,
        patch: RecordPatch,
    ) -> Result<&CharacterRecord, StoreError> {
        self.check_index(account, index)?;
        let snapshot = self.snapshot();
        if let Some(record) = self.records_mut(account)?.get_mut(index) {
            record.apply(patch);
        }
        self.persist_or_restore(snapshot)?;
        debug!(account = %account, index, "character updated");
        self.get_character(account, index)
    }

    pub fn delete_character(&mut self, account: &str, index: usize) -> Result<CharacterRecord, StoreError> {
        self.check_index(account, index)?;
        let snapshot = self.snapshot();
        let removed = self.records_mut(account)?.remove(index);
        self.persist_or_restore(snapshot)?;
        info!(account = %account, index, "character deleted");
        Ok(removed)
    }

    /// Delete several records in one action.
    ///
    /// Every index is checked against the list as it is now; then removal
    /// runs in descending order so earlier removals never shift later ones.
    /// Repeated indices count once. Returns the removed records in the order
    /// they were removed.
    pub fn delete_characters(&mut self, account: &str, indices: &[usize]) -> Result<Vec<CharacterRecord>, StoreError> {
        for &index in indices {
            self.check_index(account, index)?;
        }
        let mut order = indices.to_vec();
        order.sort_unstable_by(|a, b| b.cmp(a));
        order.dedup();

        let snapshot = self.snapshot();
        let records = self.records_mut(account)?;
        let removed: Vec<CharacterRecord> = order.iter().map(|&i| records.remove(i)).collect();
        self.persist_or_restore(snapshot)?;
        info!(account = %account, count = removed.len(), "characters deleted");
        Ok(removed)
    }

    /// Append a marked clone of the record at `index`. Returns the new index.
    ///
    /// The background image is copied next to the original as
    /// `<stem>_clone<n><ext>`.
    pub fn clone_character(&mut self, account: &str, index: usize) -> Result<usize, StoreError> {
        let records = self.records(account)?;
        let mut clone = self.get_character(account, index)?.clone();
        let clone_index = resolve::mark_clone(&mut clone, records);

        if let Some(dest) = clone.background_image.as_deref().and_then(|p| copy_as_clone(Path::new(p), clone_index)) {
            clone.background_image = Some(dest.to_string_lossy().into_owned());
        }

        let snapshot = self.snapshot();
        let records = self.records_mut(account)?;
        records.push(clone);
        let new_index = records.len() - 1;
        self.persist_or_restore(snapshot)?;
        info!(account = %account, index, new_index, clone_index, "character cloned");
        Ok(new_index)
    }

    /// Copy `image` into the account's implants folder and point the record at it.
    pub fn change_background(
        &mut self,
        account: &str,
        index: usize,
        image: &Path,
    ) -> Result<&CharacterRecord, StoreError> {
        self.check_index(account, index)?;
        let path = self
            .copy_into_implants(account, image)
            .unwrap_or_else(|| image.to_path_buf());
        self.update_character(
            account,
            index,
            RecordPatch::background_image(path.to_string_lossy()),
        )
    }

    /// Swap in a whole collection and persist.
    pub fn replace_all(&mut self, accounts: AccountCollection) -> Result<(), StoreError> {
        let previous = std::mem::replace(&mut self.accounts, accounts);
        self.persist_or_restore(previous)
    }

    /// Direct list access for batch operations that persist on their own.
    pub(crate) fn accounts_mut(&mut self) -> &mut AccountCollection {
        &mut self.accounts
    }

    /// Copy `source` into `<base>/<account>/implants/`, keeping its file name.
    ///
    /// Returns the destination, or `None` (after a warning) when the copy failed.
    fn copy_into_implants(&self, account: &str, source: &Path) -> Option<PathBuf> {
        let dir = self.implants_dir(account);
        let dest = dir.join(source.file_name()?);

        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(path = %dir.display(), error = %e, "cannot create implants folder");
            return None;
        }
        copy_file(source, &dest).then_some(dest)
    }
}

/// Copy one file, refusing to copy a file onto itself.
pub(crate) fn copy_file(source: &Path, dest: &Path) -> bool {
    if same_file(source, dest) {
        return true;
    }
    match fs::copy(source, dest) {
        Ok(_) => true,
        Err(e) => {
            warn!(
                source = %source.display(),
                dest = %dest.display(),
                error = %e,
                "image copy failed"
            );
            false
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// `<dir>/<stem without _clone…>_clone<n><ext>`
fn clone_image_path(image: &Path, clone_index: u32) -> Option<PathBuf> {
    let stem = image.file_stem()?.to_string_lossy();
    let base = stem.split(resolve::CLONE_SUFFIX).next().unwrap_or(&stem);
    let ext = image
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let name = format!("{base}{}{clone_index}{ext}", resolve::CLONE_SUFFIX);
    Some(image.with_file_name(name))
}

fn copy_as_clone(image: &Path, clone_index: u32) -> Option<PathBuf> {
    if !image.is_file() {
        return None;
    }
    let dest = clone_image_path(image, clone_index)?;
    copy_file(image, &dest).then_some(dest)
}

/// Trimmed id, or an error for ids that cannot name a folder under the base.
pub(crate) fn validate_account_id(id: &str) -> Result<&str, StoreError> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(StoreError::InvalidAccountId(id.to_string()));
    }
    Ok(trimmed)
}

/// Load the collection from `path`.
///
/// A missing file is created empty. Unparseable content is logged and
/// treated as empty, never as a startup failure.
pub fn load_all(path: &Path) -> Result<AccountCollection, StoreError> {
    if !path.exists() {
        let empty = AccountCollection::new();
        write_collection(path, &empty)?;
        return Ok(empty);
    }

    let content = fs::read(path)?;
    match serde_json::from_slice(&content) {
        Ok(accounts) => Ok(accounts),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "character data unreadable, starting empty");
            Ok(AccountCollection::new())
        }
    }
}

pub(crate) fn write_collection(path: &Path, accounts: &AccountCollection) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(accounts)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use implant_core::SampleNumber;
    use tempfile::tempdir;

    fn rec(sample: &str, name: &str) -> CharacterRecord {
        CharacterRecord {
            sample_number: Some(sample.into()),
            vernacular_id: Some(name.into()),
            ..CharacterRecord::default()
        }
    }

    fn samples(store: &Store, account: &str) -> Vec<String> {
        store
            .records(account)
            .unwrap()
            .iter()
            .map(|r| r.sample_number.as_ref().map(|s| s.to_string()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path(), None).unwrap();
        assert!(store.accounts().is_empty());
        assert_eq!(fs::read_to_string(dir.path().join(DATA_FILE_NAME)).unwrap().trim(), "{}");
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE_NAME), "{ not json").unwrap();
        let store = Store::open(dir.path(), None).unwrap();
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn non_utf8_file_loads_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE_NAME), [0xFF, 0xFE, b'{', b'}']).unwrap();
        let store = Store::open(dir.path(), None).unwrap();
        assert!(store.accounts().is_empty());
    }

    /// Swap the data file for a directory so every later write fails.
    fn break_data_file(store: &Store) {
        fs::remove_file(store.data_file()).unwrap();
        fs::create_dir(store.data_file()).unwrap();
    }

    #[test]
    fn failed_write_rolls_back_every_mutation() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character("a", rec("1", "Ava"), None).unwrap();
        store.add_character("a", rec("2", "Bram"), None).unwrap();
        let before = store.accounts().clone();
        break_data_file(&store);

        assert!(matches!(store.add_character("a", rec("3", "Cid"), None), Err(StoreError::Io(_))));
        assert!(store.add_character("b", rec("4", "Dot"), None).is_err());
        assert!(store.add_account("c").is_err());
        assert!(store.insert_candidate("a", rec("1", "dup"), None, false, None).is_err());
        assert!(store.update_character("a", 0, RecordPatch::comments("lost")).is_err());
        assert!(store.delete_character("a", 1).is_err());
        assert!(store.delete_characters("a", &[0, 1]).is_err());
        assert!(store.clone_character("a", 0).is_err());
        assert!(store.replace_all(AccountCollection::new()).is_err());

        assert_eq!(store.accounts(), &before);
    }

    #[test]
    fn padded_account_ids_are_trimmed_on_insert() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character(" main", rec("1", "Ava"), None).unwrap();
        store
            .insert_candidate("main ", rec("2", "Bram"), None, true, None)
            .unwrap();

        assert_eq!(store.get_all_account_ids(), vec!["main"]);
        assert_eq!(samples(&store, "main"), vec!["1", "2"]);
        let reopened = Store::open(dir.path(), None).unwrap();
        assert_eq!(samples(&reopened, "main"), vec!["1", "2"]);
    }

    #[test]
    fn delete_rejects_bad_index_and_keeps_list() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character("a", rec("A", "A"), None).unwrap();
        assert_eq!(
            store.delete_character("a", 1).unwrap_err(),
            StoreError::IndexOutOfRange {
                account: "a".into(),
                index: 1,
                len: 1
            }
        );
        assert_eq!(samples(&store, "a"), vec!["A"]);
        assert_eq!(store.delete_character("a", 0).unwrap().vernacular_id.as_deref(), Some("A"));
        assert!(store.records("a").unwrap().is_empty());
    }

    #[test]
    fn mutations_are_durable() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character("steam1", rec("1", "Ava"), None).unwrap();
        store.add_character("steam0", rec("2", "Bram"), None).unwrap();

        let reopened = Store::open(dir.path(), None).unwrap();
        assert_eq!(reopened.get_all_account_ids(), vec!["steam1", "steam0"]);
        let first = reopened.get_character("steam1", 0).unwrap();
        assert_eq!(first.vernacular_id.as_deref(), Some("Ava"));
        assert!(!first.date_added.is_empty());
        assert!(dir.path().join("steam1").join(IMPLANTS_DIR).is_dir());
    }

    #[test]
    fn open_reset_discards_data() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character("a", rec("1", "x"), None).unwrap();
        let store = Store::open_reset(dir.path(), None).unwrap();
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn add_account_rejects_duplicates_and_blanks() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_account("  main ").unwrap();
        assert_eq!(store.get_all_account_ids(), vec!["main"]);
        assert_eq!(store.add_account("main"), Err(StoreError::AccountExists("main".into())));
        assert!(matches!(store.add_account("   "), Err(StoreError::InvalidAccountId(_))));
        assert!(matches!(store.add_account("../x"), Err(StoreError::InvalidAccountId(_))));
    }

    #[test]
    fn update_keeps_date_and_rejects_bad_index() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        let mut r = rec("1", "Ava");
        r.date_added = "2024-01-01 00:00:00".into();
        store.add_character("a", r, None).unwrap();

        let updated = store.update_character("a", 0, RecordPatch::comments("good")).unwrap();
        assert_eq!(updated.comments, "good");
        assert_eq!(updated.date_added, "2024-01-01 00:00:00");

        assert_eq!(
            store.update_character("a", 3, RecordPatch::comments("x")).unwrap_err(),
            StoreError::IndexOutOfRange {
                account: "a".into(),
                index: 3,
                len: 1
            }
        );
        assert!(matches!(
            store.update_character("nobody", 0, RecordPatch::default()),
            Err(StoreError::UnknownAccount(_))
        ));
    }

    #[test]
    fn batch_delete_runs_descending() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        for s in ["A", "B", "C"] {
            store.add_character("a", rec(s, s), None).unwrap();
        }
        let removed = store.delete_characters("a", &[0, 2]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(samples(&store, "a"), vec!["B"]);
    }

    #[test]
    fn batch_delete_is_all_or_nothing() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.add_character("a", rec("A", "A"), None).unwrap();
        assert!(store.delete_characters("a", &[0, 5]).is_err());
        assert_eq!(samples(&store, "a"), vec!["A"]);
    }

    #[test]
    fn insert_candidate_surfaces_choice_without_side_effects() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        store.insert_candidate("a", rec("100", "orig"), None, true, None).unwrap();

        let err = store.insert_candidate("a", rec("100", "dup"), None, true, None).unwrap_err();
        assert_eq!(
            err,
            StoreError::ChoiceRequired {
                sample_number: SampleNumber::from("100"),
                index: 0
            }
        );
        assert_eq!(store.records("a").unwrap().len(), 1);

        let outcome = store
            .insert_candidate("a", rec("100", "dup"), None, true, Some(DuplicateChoice::Clone))
            .unwrap();
        assert_eq!(outcome, Outcome::Cloned { index: 1, clone_index: 1 });
    }

    #[test]
    fn image_is_copied_into_implants() {
        let dir = tempdir().unwrap();
        let src_dir = tempdir().unwrap();
        let src = src_dir.path().join("ava.png");
        fs::write(&src, b"png").unwrap();

        let mut store = Store::open(dir.path(), None).unwrap();
        let stored = store.add_character("a", rec("1", "Ava"), Some(&src)).unwrap();
        let expected = dir.path().join("a").join(IMPLANTS_DIR).join("ava.png");
        assert_eq!(stored.background_image.as_deref(), Some(expected.to_string_lossy().as_ref()));
        assert!(expected.is_file());
        assert!(src.is_file());
    }

    #[test]
    fn failed_copy_keeps_record() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nowhere.png");
        let mut store = Store::open(dir.path(), None).unwrap();
        let stored = store.add_character("a", rec("1", "Ava"), Some(&missing)).unwrap();
        assert_eq!(
            stored.background_image.as_deref(),
            Some(missing.to_string_lossy().as_ref())
        );
        assert_eq!(store.records("a").unwrap().len(), 1);
    }

    #[test]
    fn clone_copies_image_with_suffix() {
        let dir = tempdir().unwrap();
        let mut store = Store::open(dir.path(), None).unwrap();
        let implants = dir.path().join("a").join(IMPLANTS_DIR);
        fs::create_dir_all(&implants).unwrap();
        let image = implants.join("rex.png");
        fs::write(&image, b"png").unwrap();

        let mut r = rec("9", "Rex");
        r.background_image = Some(image.to_string_lossy().into_owned());
        store.add_character("a", r, None).unwrap();

        let first = store.clone_character("a", 0).unwrap();
        let second = store.clone_character("a", first).unwrap();

        let c1 = store.get_character("a", first).unwrap();
        assert_eq!(c1.clone_index, Some(1));
        assert!(implants.join("rex_clone1.png").is_file());

        let c2 = store.get_character("a", second).unwrap();
        assert_eq!(c2.clone_index, Some(2));
        // Stem of a clone image is stripped back to the original first
        assert!(c2.background_image.as_deref().unwrap().ends_with("rex_clone2.png"));
        assert_eq!(store.get_character("a", 0).unwrap().is_clone, None);
    }

    #[test]
    fn clone_image_naming() {
        let p = clone_image_path(Path::new("/x/rex_clone3.png"), 4).unwrap();
        assert_eq!(p, PathBuf::from("/x/rex_clone4.png"));
        let p = clone_image_path(Path::new("/x/noext"), 1).unwrap();
        assert_eq!(p, PathBuf::from("/x/noext_clone1"));
    }
}
