// CSV import/export of the character collection

use std::collections::HashMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{info, warn};

use implant_core::builder::now_stamp;
use implant_core::model::NOT_AVAILABLE;
use implant_core::resolve::find_match;
use implant_core::{CharacterRecord, SampleNumber};

use crate::error::StoreError;
use crate::store::{AccountCollection, Store};

/// Canonical column order.
pub const HEADERS: [&str; 10] = [
    "Steam ID",
    "Sample Number",
    "Vernacular ID",
    "Gender",
    "Survival Quotient",
    "Chibi Levels",
    "Explorer Notes",
    "Comments",
    "Image Path",
    "Date Added",
];

/// Appended after [`HEADERS`] by the extended layout.
pub const EXTENDED_HEADERS: [&str; 2] = ["Is Clone", "Clone Index"];

/// Joins list-valued fields into one cell.
pub const LIST_SEPARATOR: &str = ", ";

/// Accepted names for the account column on import.
const ACCOUNT_HEADERS: &[&str] = &["Steam ID", "Account ID"];
const SAMPLE_HEADER: &str = "Sample Number";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportLayout {
    #[default]
    Standard,
    /// Adds `Is Clone` and `Clone Index`.
    Extended,
}

impl ExportLayout {
    pub fn headers(self) -> Vec<&'static str> {
        let mut headers = HEADERS.to_vec();
        if self == Self::Extended {
            headers.extend(EXTENDED_HEADERS);
        }
        headers
    }
}

pub fn join_list(items: &[String]) -> String {
    items.join(LIST_SEPARATOR)
}

/// Inverse of [`join_list`]. An empty cell is an empty list.
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(LIST_SEPARATOR).map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn export_row(account: &str, r: &CharacterRecord, layout: ExportLayout) -> Vec<String> {
    let mut row = vec![
        account.to_string(),
        or_na(r.sample_number.as_ref().map(SampleNumber::as_str)),
        or_na(r.vernacular_id.as_deref()),
        or_na(r.gender.as_deref()),
        join_list(&r.survival_quotient),
        r.chibi_levels.clone(),
        join_list(&r.explorer_notes),
        r.comments.clone(),
        or_na(r.background_image.as_deref()),
        or_na(Some(r.date_added.as_str()).filter(|d| !d.is_empty())),
    ];
    if layout == ExportLayout::Extended {
        row.push(if r.is_clone() { "Yes" } else { "No" }.to_string());
        row.push(r.clone_index.unwrap_or(0).to_string());
    }
    row
}

/// Write every account's records as CSV. Returns the number of data rows.
pub fn export_to_writer<W: Write>(
    accounts: &AccountCollection,
    writer: W,
    layout: ExportLayout,
) -> Result<usize, StoreError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(layout.headers())
        .map_err(|e| StoreError::Io(e.to_string()))?;

    let mut rows = 0;
    for (account, records) in accounts {
        for r in records {
            writer
                .write_record(export_row(account, r, layout))
                .map_err(|e| StoreError::Io(e.to_string()))?;
            rows += 1;
        }
    }
    writer.flush()?;
    Ok(rows)
}

pub fn export(accounts: &AccountCollection, path: &Path, layout: ExportLayout) -> Result<usize, StoreError> {
    let file = fs::File::create(path)?;
    let rows = export_to_writer(accounts, file, layout)?;
    info!(path = %path.display(), rows, "collection exported");
    Ok(rows)
}

/// `{sample}_{name}.csv`. Spaces and path separators become `_`, so the
/// result is always a single file name.
pub fn per_character_file_name(r: &CharacterRecord) -> String {
    let sample = r
        .identity()
        .map(|s| file_safe(s.as_str()))
        .unwrap_or_else(|| "unknown".to_string());
    let name = r
        .vernacular_id
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(file_safe)
        .unwrap_or_else(|| "character".to_string());
    format!("{sample}_{name}.csv")
}

fn file_safe(part: &str) -> String {
    part.trim()
        .replace([' ', '/', '\\'], "_")
        .replace("..", "_")
}

/// Write one extended-layout CSV per selected `(account, index)` into `out_dir`.
///
/// Unknown selections and per-file write failures are logged and skipped.
/// Returns the number of files written.
pub fn export_each(
    accounts: &AccountCollection,
    selection: &[(&str, usize)],
    out_dir: &Path,
) -> Result<usize, StoreError> {
    fs::create_dir_all(out_dir)?;
    let mut written = 0;

    for &(account, index) in selection {
        let Some(record) = accounts.get(account).and_then(|list| list.get(index)) else {
            warn!(account = %account, index, "no such character, skipped");
            continue;
        };

        let path = out_dir.join(per_character_file_name(record));
        let mut single = AccountCollection::new();
        single.insert(account.to_string(), vec![record.clone()]);

        let result = fs::File::create(&path)
            .map_err(StoreError::from)
            .and_then(|file| export_to_writer(&single, file, ExportLayout::Extended));
        match result {
            Ok(_) => written += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "character export failed"),
        }
    }

    info!(dir = %out_dir.display(), written, "characters exported");
    Ok(written)
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub succeeded: usize,
    pub failed: usize,
    pub diagnostics: Vec<String>,
    /// The file was rejected before any row was processed.
    pub aborted: bool,
}

impl ImportReport {
    fn abort(message: impl Into<String>) -> Self {
        Self {
            succeeded: 0,
            failed: 1,
            diagnostics: vec![message.into()],
            aborted: true,
        }
    }

    fn row_error(&mut self, row_number: usize, message: impl std::fmt::Display) {
        self.failed += 1;
        self.diagnostics.push(format!("Row {row_number}: {message}"));
    }
}

/// Read file and convert to UTF-8 if needed (Windows-1252 fallback for
/// spreadsheet-exported files).
pub fn read_file_as_utf8(path: &Path) -> Result<String, StoreError> {
    let mut file = fs::File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Import rows from a CSV file into `store`.
///
/// Structural problems (missing file, not CSV, missing required headers)
/// abort before any row is touched. Row problems are collected and the
/// remaining rows still import. With `overwrite`, a row whose sample number
/// already exists in its account replaces that record in place; otherwise
/// every row is appended.
pub fn import(store: &mut Store, path: &Path, overwrite: bool) -> Result<ImportReport, StoreError> {
    if !path.exists() {
        return Ok(ImportReport::abort(format!("File does not exist: {}", path.display())));
    }
    let content = match read_file_as_utf8(path) {
        Ok(c) => c,
        Err(e) => return Ok(ImportReport::abort(format!("Cannot read file: {e}"))),
    };
    import_from_str(store, &content, overwrite)
}

struct Columns {
    index: HashMap<String, usize>,
    account: usize,
    sample: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();

        let account = ACCOUNT_HEADERS.iter().find_map(|h| index.get(*h).copied());
        let sample = index.get(SAMPLE_HEADER).copied();

        match (account, sample) {
            (Some(account), Some(sample)) => Ok(Self { index, account, sample }),
            _ => {
                let mut missing = Vec::new();
                if account.is_none() {
                    missing.push(ACCOUNT_HEADERS[0]);
                }
                if sample.is_none() {
                    missing.push(SAMPLE_HEADER);
                }
                Err(format!("Missing required headers: {}", missing.join(", ")))
            }
        }
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, header: &str) -> &'r str {
        self.index
            .get(header)
            .and_then(|&i| row.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Empty and `N/A` both mean absent.
fn optional(cell: &str) -> Option<String> {
    (!cell.is_empty() && cell != NOT_AVAILABLE).then(|| cell.to_string())
}

fn record_from_row(row: &csv::StringRecord, cols: &Columns, sample: &str) -> Result<CharacterRecord, String> {
    let is_clone = match cols.get(row, "Is Clone") {
        "" | NOT_AVAILABLE => None,
        v if v.eq_ignore_ascii_case("yes") => Some(true),
        v if v.eq_ignore_ascii_case("no") => None,
        other => return Err(format!("invalid Is Clone value '{other}'")),
    };
    let clone_index = match cols.get(row, "Clone Index") {
        "" | "0" | NOT_AVAILABLE => None,
        v => Some(
            v.parse::<u32>()
                .map_err(|_| format!("invalid Clone Index value '{v}'"))?,
        ),
    };
    let chibi = cols.get(row, "Chibi Levels");
    let date = cols.get(row, "Date Added");

    Ok(CharacterRecord {
        sample_number: Some(SampleNumber::new(sample)),
        vernacular_id: optional(cols.get(row, "Vernacular ID")),
        gender: optional(cols.get(row, "Gender")),
        survival_quotient: split_list(cols.get(row, "Survival Quotient")),
        chibi_levels: if chibi.is_empty() { NOT_AVAILABLE.to_string() } else { chibi.to_string() },
        explorer_notes: split_list(cols.get(row, "Explorer Notes")),
        comments: cols.get(row, "Comments").to_string(),
        background_image: optional(cols.get(row, "Image Path")),
        date_added: if date.is_empty() || date == NOT_AVAILABLE { now_stamp() } else { date.to_string() },
        is_clone,
        clone_index,
    })
}

/// Import from CSV text already in memory. See [`import`].
pub fn import_from_str(store: &mut Store, content: &str, overwrite: bool) -> Result<ImportReport, StoreError> {
    let preview: String = content.chars().take(1024).collect();
    if !preview.contains(',') {
        return Ok(ImportReport::abort(
            "File doesn't appear to be a valid CSV (no commas found)",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let cols = match reader.headers() {
        Ok(headers) => match Columns::from_headers(headers) {
            Ok(cols) => cols,
            Err(msg) => return Ok(ImportReport::abort(msg)),
        },
        Err(e) => return Ok(ImportReport::abort(format!("CSV parsing error: {e}"))),
    };

    let mut report = ImportReport::default();
    let snapshot = store.snapshot();

    for (i, result) in reader.records().enumerate() {
        // Header is row 1
        let row_number = i + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                report.row_error(row_number, e);
                continue;
            }
        };

        let account = row.get(cols.account).map(str::trim).unwrap_or("");
        if account.is_empty() {
            report.row_error(row_number, "No account ID found");
            continue;
        }
        let sample = row.get(cols.sample).map(str::trim).unwrap_or("");
        if sample.is_empty() || sample == NOT_AVAILABLE {
            report.row_error(row_number, "No valid Sample Number");
            continue;
        }

        let record = match record_from_row(&row, &cols, sample) {
            Ok(r) => r,
            Err(msg) => {
                report.row_error(row_number, msg);
                continue;
            }
        };

        let records = match store.ensure_account(account) {
            Ok(records) => records,
            Err(e) => {
                report.row_error(row_number, e);
                continue;
            }
        };

        let existing = if overwrite {
            find_match(&SampleNumber::new(sample), records.as_slice())
        } else {
            None
        };
        match existing {
            Some(index) => records[index] = record,
            None => records.push(record),
        }
        report.succeeded += 1;
    }

    if report.succeeded > 0 {
        store.persist_or_restore(snapshot)?;
    }
    info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "csv import finished"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Header plus a fully populated and a minimal example row.
pub fn template_rows() -> Vec<Vec<String>> {
    let full = [
        "mysteamid",
        "123456789",
        "Example Character",
        "M",
        "Alpha Broodmother, Alpha Megapithecus",
        "Chibi-Dino Level-Ups: 2, Max Level: +2",
        "All Explorer Notes found +10 Max Levels, All Scorched Earth notes",
        "This is an example character",
        "",
    ];
    let minimal = [
        "mysteamid",
        "987654321",
        "Minimal Example",
        "F",
        "",
        "",
        "",
        "Only required fields filled",
        "",
        "",
    ];

    let mut full_row: Vec<String> = full.iter().map(|s| s.to_string()).collect();
    full_row.push(now_stamp());

    vec![
        HEADERS.iter().map(|s| s.to_string()).collect(),
        full_row,
        minimal.iter().map(|s| s.to_string()).collect(),
    ]
}

pub fn write_template(path: &Path) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| StoreError::Io(e.to_string()))?;
    for row in template_rows() {
        writer
            .write_record(&row)
            .map_err(|e| StoreError::Io(e.to_string()))?;
    }
    writer.flush()?;
    info!(path = %path.display(), "import template written");
    Ok(())
}
