// Backup, restore and storage information

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::scan::is_implant_image;
use crate::store::{copy_file, validate_account_id, write_collection, AccountCollection, Store};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub file: PathBuf,
    pub characters: usize,
    /// Set when images were requested.
    pub image_dir: Option<PathBuf>,
    pub copied_images: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStorage {
    pub account: String,
    pub characters: usize,
    pub images: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub base_directory: PathBuf,
    pub data_file: PathBuf,
    pub base_dir_exists: bool,
    pub data_file_exists: bool,
    /// File names directly under the base directory, sorted.
    pub directory_contents: Vec<String>,
    pub accounts: Vec<AccountStorage>,
}

impl Store {
    /// Write the collection to `characters_backup_<stamp>.json` in `dir`.
    ///
    /// With `include_images`, every background image that still exists is
    /// copied to `images_<stamp>/<account>/`. Missing or uncopyable images
    /// are logged and left out of the count.
    pub fn backup(&self, dir: &Path, include_images: bool) -> Result<BackupReport, StoreError> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        fs::create_dir_all(dir)?;

        let file = dir.join(format!("characters_backup_{stamp}.json"));
        write_collection(&file, self.accounts())?;

        let mut report = BackupReport {
            file,
            characters: self.accounts().values().map(Vec::len).sum(),
            image_dir: None,
            copied_images: 0,
        };

        if include_images {
            let image_dir = dir.join(format!("images_{stamp}"));
            for (account, records) in self.accounts() {
                // Keys from a restored file never went through add_account
                let Ok(folder) = validate_account_id(account) else {
                    warn!(account = %account, "backup: account id is not a folder name, images skipped");
                    continue;
                };
                let account_dir = image_dir.join(folder);
                fs::create_dir_all(&account_dir)?;

                for image in records.iter().filter_map(|r| r.background_image.as_deref()) {
                    let source = Path::new(image);
                    let Some(name) = source.file_name() else { continue };
                    if !source.is_file() {
                        warn!(image = %source.display(), "backup: image missing, skipped");
                        continue;
                    }
                    if copy_file(source, &account_dir.join(name)) {
                        report.copied_images += 1;
                    }
                }
            }
            report.image_dir = Some(image_dir);
        }

        info!(
            file = %report.file.display(),
            characters = report.characters,
            images = report.copied_images,
            "backup written"
        );
        Ok(report)
    }

    /// Replace the whole collection with the contents of a backup file.
    ///
    /// Unlike startup, an unparseable file is an error and the current
    /// collection stays as it is. Returns the number of restored characters.
    pub fn restore(&mut self, file: &Path) -> Result<usize, StoreError> {
        let content = fs::read_to_string(file)?;
        let accounts: AccountCollection = serde_json::from_str(&content)?;
        let count: usize = accounts.values().map(Vec::len).sum();
        self.replace_all(accounts)?;
        info!(file = %file.display(), characters = count, "backup restored");
        Ok(count)
    }

    pub fn storage_info(&self) -> StorageInfo {
        let base = self.base_directory();
        let mut directory_contents: Vec<String> = fs::read_dir(base)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        directory_contents.sort();

        let accounts = self
            .accounts()
            .iter()
            .map(|(account, records)| AccountStorage {
                account: account.clone(),
                characters: records.len(),
                images: count_images(&self.implants_dir(account)),
            })
            .collect();

        StorageInfo {
            base_directory: base.to_path_buf(),
            data_file: self.data_file().to_path_buf(),
            base_dir_exists: base.is_dir(),
            data_file_exists: self.data_file().is_file(),
            directory_contents,
            accounts,
        }
    }
}

fn count_images(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| is_implant_image(&e.path()))
                .count()
        })
        .unwrap_or(0)
}
