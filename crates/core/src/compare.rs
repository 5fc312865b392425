// Side-by-side field comparison of several records.

use crate::model::{CharacterRecord, NOT_AVAILABLE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub field: &'static str,
    /// One cell per compared record, in input order.
    pub values: Vec<String>,
}

type Cell = fn(&CharacterRecord) -> String;

fn or_na(v: Option<&str>) -> String {
    v.unwrap_or(NOT_AVAILABLE).to_string()
}

/// Row label and how to render that row's cell.
const FIELDS: &[(&str, Cell)] = &[
    ("Sample Number", |r| or_na(r.sample_number.as_ref().map(|s| s.as_str()))),
    ("Name", |r| or_na(r.vernacular_id.as_deref())),
    ("Gender", |r| or_na(r.gender.as_deref())),
    ("Boss Kills", |r| r.survival_quotient.join("\n")),
    ("Chibi Levels", |r| r.chibi_levels.clone()),
    ("Explorer Notes", |r| r.explorer_notes.join("\n")),
    ("Date Added", |r| or_na(Some(r.date_added.as_str()).filter(|d| !d.is_empty()))),
    ("Is Clone", |r| if r.is_clone() { "Yes" } else { "No" }.to_string()),
];

/// Build the comparison table. Needs at least two records.
pub fn compare(records: &[&CharacterRecord]) -> Option<Vec<ComparisonRow>> {
    if records.len() < 2 {
        return None;
    }

    let rows = FIELDS
        .iter()
        .map(|&(field, cell)| ComparisonRow {
            field,
            values: records.iter().map(|r| cell(r)).collect(),
        })
        .collect();
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_two_records() {
        let r = CharacterRecord::default();
        assert!(compare(&[&r]).is_none());
        assert!(compare(&[]).is_none());
    }

    #[test]
    fn renders_every_field() {
        let a = CharacterRecord {
            sample_number: Some("1".into()),
            vernacular_id: Some("Ava".into()),
            survival_quotient: vec!["Alpha Broodmother".into(), "Beta Dragon".into()],
            date_added: "2024-01-01 00:00:00".into(),
            ..CharacterRecord::default()
        };
        let b = CharacterRecord {
            sample_number: Some("1".into()),
            is_clone: Some(true),
            clone_index: Some(1),
            ..CharacterRecord::default()
        };

        let rows = compare(&[&a, &b]).unwrap();
        assert_eq!(rows.len(), 8);

        let get = |field: &str| rows.iter().find(|r| r.field == field).unwrap().values.clone();
        assert_eq!(get("Name"), vec!["Ava", "N/A"]);
        assert_eq!(get("Boss Kills"), vec!["Alpha Broodmother\nBeta Dragon", ""]);
        assert_eq!(get("Chibi Levels"), vec!["N/A", "N/A"]);
        assert_eq!(get("Date Added"), vec!["2024-01-01 00:00:00", "N/A"]);
        assert_eq!(get("Is Clone"), vec!["No", "Yes"]);
    }
}
