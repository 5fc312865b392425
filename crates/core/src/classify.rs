// Line classification for implant OCR text.
//
// Plain substring markers checked in a fixed priority order. A line feeds at
// most one field: the first rule whose marker appears wins.

/// Record field a classified line contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    SampleNumber,
    VernacularId,
    Gender,
    /// Appended to `survival_quotient`.
    SurvivalQuotient,
    /// Overwrites `chibi_levels`; the last occurrence wins.
    ChibiLevels,
    /// Appended to `explorer_notes`.
    ExplorerNotes,
}

impl std::fmt::Display for FieldTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SampleNumber => write!(f, "sample_number"),
            Self::VernacularId => write!(f, "vernacular_id"),
            Self::Gender => write!(f, "gender"),
            Self::SurvivalQuotient => write!(f, "survival_quotient"),
            Self::ChibiLevels => write!(f, "chibi_levels"),
            Self::ExplorerNotes => write!(f, "explorer_notes"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extract {
    /// Text after the last `:`, trimmed. Values may themselves contain colons.
    AfterLastColon,
    /// The whole trimmed line.
    WholeLine,
}

impl Extract {
    fn apply(self, line: &str) -> String {
        match self {
            Self::AfterLastColon => line.rsplit(':').next().unwrap_or(line).trim().to_string(),
            Self::WholeLine => line.to_string(),
        }
    }
}

struct LineRule {
    markers: &'static [&'static str],
    tag: FieldTag,
    extract: Extract,
}

/// Priority order matters: `Gender: Alpha` is a gender line, not a boss line.
const RULES: &[LineRule] = &[
    LineRule {
        markers: &["Sample #:"],
        tag: FieldTag::SampleNumber,
        extract: Extract::AfterLastColon,
    },
    LineRule {
        markers: &["Vernacular ID:"],
        tag: FieldTag::VernacularId,
        extract: Extract::AfterLastColon,
    },
    LineRule {
        markers: &["Gender:"],
        tag: FieldTag::Gender,
        extract: Extract::AfterLastColon,
    },
    LineRule {
        markers: &["Alpha", "Beta", "Gamma"],
        tag: FieldTag::SurvivalQuotient,
        extract: Extract::WholeLine,
    },
    LineRule {
        markers: &["Chibi-Dino Level-Ups:"],
        tag: FieldTag::ChibiLevels,
        extract: Extract::WholeLine,
    },
    LineRule {
        markers: &["Explorer Notes", "Tall Tale Explorer Notes"],
        tag: FieldTag::ExplorerNotes,
        extract: Extract::WholeLine,
    },
];

/// A classified line: which field it feeds and the extracted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub tag: FieldTag,
    pub value: String,
}

/// Classify one line of OCR text. Blank lines and unmatched lines yield `None`.
pub fn classify_line(line: &str) -> Option<LineMatch> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    RULES
        .iter()
        .find(|rule| rule.markers.iter().any(|m| line.contains(m)))
        .map(|rule| LineMatch {
            tag: rule.tag,
            value: rule.extract.apply(line),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(line: &str) -> (FieldTag, String) {
        let m = classify_line(line).unwrap_or_else(|| panic!("no match for {line:?}"));
        (m.tag, m.value)
    }

    #[test]
    fn sample_number_after_colon() {
        assert_eq!(classify("Sample #: 12345"), (FieldTag::SampleNumber, "12345".to_string()));
        assert_eq!(classify("   Sample #:   12345   "), (FieldTag::SampleNumber, "12345".to_string()));
    }

    #[test]
    fn last_colon_wins() {
        assert_eq!(classify("Sample #: AB:12"), (FieldTag::SampleNumber, "12".to_string()));
        assert_eq!(classify("Vernacular ID: Lady: Rex"), (FieldTag::VernacularId, "Rex".to_string()));
    }

    #[test]
    fn empty_value_is_accepted() {
        assert_eq!(classify("Sample #:"), (FieldTag::SampleNumber, String::new()));
    }

    #[test]
    fn gender_outranks_boss_line() {
        assert_eq!(classify("Gender: Alpha"), (FieldTag::Gender, "Alpha".to_string()));
        assert_eq!(classify("Alpha Gender: Male"), (FieldTag::Gender, "Male".to_string()));
    }

    #[test]
    fn sample_outranks_everything() {
        // Both markers present: sample wins, value is still after the last colon
        assert_eq!(
            classify("Sample #: 5 Vernacular ID: Bob"),
            (FieldTag::SampleNumber, "Bob".to_string())
        );
    }

    #[test]
    fn boss_lines_keep_the_full_line() {
        assert_eq!(
            classify("  Beta Dragon  "),
            (FieldTag::SurvivalQuotient, "Beta Dragon".to_string())
        );
        assert_eq!(
            classify("Gamma Broodmother Lysrix"),
            (FieldTag::SurvivalQuotient, "Gamma Broodmother Lysrix".to_string())
        );
    }

    #[test]
    fn boss_outranks_chibi() {
        assert_eq!(
            classify("Chibi-Dino Level-Ups: 3 Alpha"),
            (FieldTag::SurvivalQuotient, "Chibi-Dino Level-Ups: 3 Alpha".to_string())
        );
    }

    #[test]
    fn chibi_keeps_the_full_line() {
        assert_eq!(
            classify("Chibi-Dino Level-Ups: 2, Max Level: +2"),
            (FieldTag::ChibiLevels, "Chibi-Dino Level-Ups: 2, Max Level: +2".to_string())
        );
    }

    #[test]
    fn explorer_notes_variants() {
        assert_eq!(
            classify("All Explorer Notes found +10"),
            (FieldTag::ExplorerNotes, "All Explorer Notes found +10".to_string())
        );
        assert_eq!(
            classify("Tall Tale Explorer Notes"),
            (FieldTag::ExplorerNotes, "Tall Tale Explorer Notes".to_string())
        );
    }

    #[test]
    fn unmatched_and_blank_lines_are_discarded() {
        assert_eq!(classify_line(""), None);
        assert_eq!(classify_line("    "), None);
        assert_eq!(classify_line("Implant"), None);
        // Markers are case-sensitive
        assert_eq!(classify_line("sample #: 1"), None);
    }

    proptest! {
        #[test]
        fn sample_value_is_text_after_last_colon(
            head in "[A-Za-z0-9 ]{0,8}",
            tail in "[A-Za-z0-9_-]{1,12}",
        ) {
            let line = format!("Sample #: {head}:{tail}");
            let m = classify_line(&line).unwrap();
            prop_assert_eq!(m.tag, FieldTag::SampleNumber);
            prop_assert_eq!(m.value, tail);
        }

        #[test]
        fn gender_line_with_boss_word_is_gender(
            prefix in "[a-z ]{0,10}",
            boss in prop::sample::select(vec!["Alpha", "Beta", "Gamma"]),
            value in "[A-Za-z]{1,8}",
        ) {
            let line = format!("{prefix}{boss} Gender: {value}");
            let m = classify_line(&line).unwrap();
            prop_assert_eq!(m.tag, FieldTag::Gender);
            prop_assert_eq!(m.value, value);
        }
    }
}
