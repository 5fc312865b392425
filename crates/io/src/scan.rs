// Directory scan: import implant images found under <base>/<account>/implants/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use implant_core::resolve::{BatchDecision, BatchDisambiguator};

use crate::error::StoreError;
use crate::ocr::{extract_record, TextExtractor};
use crate::store::{Store, IMPLANTS_DIR};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: usize,
    /// Images with no sample number, or whose sample number the account
    /// already held before the scan.
    pub skipped: usize,
    /// Unreadable directories, one message each.
    pub errors: Vec<String>,
}

/// `.png`, `.jpg` or `.jpeg`, case-insensitive.
pub fn is_implant_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Sorted entries of `dir` so scans are deterministic.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    paths.sort();
    Ok(paths)
}

impl Store {
    /// Import every image under `<base>/<account>/implants/` whose sample
    /// number is new to its account.
    ///
    /// Collisions inside one scan get a `_clone` suffix instead of a prompt.
    /// Persists once at the end if anything was added.
    pub fn scan_directory(&mut self, extractor: &dyn TextExtractor) -> Result<ScanReport, StoreError> {
        let mut report = ScanReport::default();
        let snapshot = self.snapshot();

        for account_dir in sorted_entries(self.base_directory())? {
            let implants = account_dir.join(IMPLANTS_DIR);
            if !account_dir.is_dir() || !implants.is_dir() {
                continue;
            }
            let Some(account) = account_dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };

            let images = match sorted_entries(&implants) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(path = %implants.display(), error = %e, "cannot read implants folder");
                    report.errors.push(format!("{}: {e}", implants.display()));
                    continue;
                }
            };

            let existing = self.accounts().get(&account).map(Vec::as_slice).unwrap_or(&[]);
            let batch = BatchDisambiguator::new(existing);

            for image in images.iter().filter(|p| p.is_file() && is_implant_image(p)) {
                let candidate = extract_record(extractor, image);
                let live = self.accounts().get(&account).map(Vec::as_slice).unwrap_or(&[]);
                match batch.admit(candidate, live) {
                    BatchDecision::Insert(record) => {
                        debug!(account = %account, image = %image.display(), sample_number = ?record.sample_number, "scanned implant added");
                        self.accounts_mut().entry(account.clone()).or_default().push(record);
                        report.added += 1;
                    }
                    BatchDecision::SkipNoIdentity => {
                        debug!(image = %image.display(), "no sample number, skipped");
                        report.skipped += 1;
                    }
                    BatchDecision::SkipKnown(sample) => {
                        debug!(image = %image.display(), sample_number = %sample, "already imported, skipped");
                        report.skipped += 1;
                    }
                }
            }
        }

        if report.added > 0 {
            self.persist_or_restore(snapshot)?;
        }
        info!(added = report.added, skipped = report.skipped, "directory scan finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_implant_image(Path::new("a.PNG")));
        assert!(is_implant_image(Path::new("a.jpeg")));
        assert!(is_implant_image(Path::new("dir/a.JpG")));
        assert!(!is_implant_image(Path::new("a.txt")));
        assert!(!is_implant_image(Path::new("png")));
    }
}
