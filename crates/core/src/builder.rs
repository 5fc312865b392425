use tracing::{debug, trace};

use crate::classify::{classify_line, FieldTag, LineMatch};
use crate::model::{CharacterRecord, SampleNumber, DATE_FORMAT};

/// Folds classified OCR lines into one [`CharacterRecord`].
///
/// Scalar fields are overwritten by later lines; list fields append in line
/// order. Extracted values are not validated.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: CharacterRecord,
    matched_lines: usize,
}

impl RecordBuilder {
    pub fn new(background_image: Option<&str>) -> Self {
        let record = CharacterRecord {
            background_image: background_image.map(str::to_string),
            ..CharacterRecord::default()
        };
        Self {
            record,
            matched_lines: 0,
        }
    }

    pub fn feed_line(&mut self, line: &str) -> &mut Self {
        if let Some(m) = classify_line(line) {
            self.fold(m);
        }
        self
    }

    pub fn feed_text(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.feed_line(line);
        }
        self
    }

    fn fold(&mut self, m: LineMatch) {
        self.matched_lines += 1;
        trace!(field = %m.tag, value = %m.value, "line classified");
        let r = &mut self.record;
        match m.tag {
            FieldTag::SampleNumber => r.sample_number = Some(SampleNumber::new(m.value)),
            FieldTag::VernacularId => r.vernacular_id = Some(m.value),
            FieldTag::Gender => r.gender = Some(m.value),
            FieldTag::SurvivalQuotient => r.survival_quotient.push(m.value),
            FieldTag::ChibiLevels => r.chibi_levels = m.value,
            FieldTag::ExplorerNotes => r.explorer_notes.push(m.value),
        }
    }

    /// Stamp `date_added` with the current local time and return the record.
    pub fn finish(self) -> CharacterRecord {
        self.finish_at(now_stamp())
    }

    pub fn finish_at(mut self, date_added: impl Into<String>) -> CharacterRecord {
        self.record.date_added = date_added.into();
        debug!(
            matched_lines = self.matched_lines,
            sample_number = ?self.record.sample_number,
            "implant text parsed"
        );
        self.record
    }
}

/// Build a record from a full OCR text block.
///
/// Empty text yields a record made entirely of defaults.
pub fn build_record(text: &str, background_image: Option<&str>) -> CharacterRecord {
    let mut builder = RecordBuilder::new(background_image);
    builder.feed_text(text);
    builder.finish()
}

/// Current local time in [`DATE_FORMAT`].
pub fn now_stamp() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
