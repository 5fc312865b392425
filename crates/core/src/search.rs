use crate::model::CharacterRecord;

/// Which fields a search query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchFields {
    pub name: bool,
    pub sample: bool,
    pub gender: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            name: true,
            sample: true,
            gender: true,
        }
    }
}

impl SearchFields {
    /// Parse a comma-separated field list (`name,sample,gender`).
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut fields = Self {
            name: false,
            sample: false,
            gender: false,
        };
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "name" => fields.name = true,
                "sample" => fields.sample = true,
                "gender" => fields.gender = true,
                other => return Err(format!("unknown search field '{other}' (expected name, sample, gender)")),
            }
        }
        if !(fields.name || fields.sample || fields.gender) {
            return Err("empty search field list".into());
        }
        Ok(fields)
    }
}

/// Case-insensitive substring search over one account's records.
///
/// Results keep their list index so they stay addressable for update and
/// delete. An empty query matches every record.
pub fn search<'a>(
    records: &'a [CharacterRecord],
    query: &str,
    fields: SearchFields,
) -> Vec<(usize, &'a CharacterRecord)> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| needle.is_empty() || matches(r, &needle, fields))
        .collect()
}

fn matches(r: &CharacterRecord, needle: &str, fields: SearchFields) -> bool {
    let hit = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(needle));

    (fields.name && hit(r.vernacular_id.as_deref()))
        || (fields.sample && hit(r.sample_number.as_ref().map(|s| s.as_str())))
        || (fields.gender && hit(r.gender.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(sample: &str, name: &str, gender: &str) -> CharacterRecord {
        CharacterRecord {
            sample_number: Some(sample.into()),
            vernacular_id: Some(name.into()),
            gender: Some(gender.into()),
            ..CharacterRecord::default()
        }
    }

    fn list() -> Vec<CharacterRecord> {
        vec![
            rec("1001", "Ava", "Female"),
            rec("2002", "Bram", "Male"),
            rec("3003", "Male Ava", "Female"),
            CharacterRecord::default(),
        ]
    }

    #[test]
    fn empty_query_matches_all() {
        let records = list();
        assert_eq!(search(&records, "  ", SearchFields::default()).len(), 4);
    }

    #[test]
    fn name_match_is_case_insensitive() {
        let records = list();
        let hits: Vec<usize> = search(&records, "ava", SearchFields::default())
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn field_flags_restrict_the_search() {
        let records = list();
        let gender_only = SearchFields {
            name: false,
            sample: false,
            gender: true,
        };
        // "male" is a substring of "Female" too
        let hits: Vec<usize> = search(&records, "male", gender_only)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, 1, 2]);

        let sample_only = SearchFields::parse("sample").unwrap();
        let hits = search(&records, "200", sample_only);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 1);
    }

    #[test]
    fn parse_field_list() {
        assert_eq!(SearchFields::parse("name, gender").unwrap(), SearchFields {
            name: true,
            sample: false,
            gender: true,
        });
        assert!(SearchFields::parse("colour").is_err());
        assert!(SearchFields::parse(" , ").is_err());
    }
}
