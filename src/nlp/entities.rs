use regex::Regex;

use crate::error::{DocmineError, Result};
use crate::models::analysis::EntityMention;

const NUMBER: &str = r"\d+(?:[.,]\d+)*";
const MONTHS: &str =
    "january|february|march|april|june|july|august|september|october|november|december";

/// Pattern-based recognizer for numeric and temporal entities.
///
/// Works on normalized (lowercase, lemmatized) text, so only entity types
/// that survive normalization are recognized: MONEY, PERCENT, DATE, ORDINAL
/// and CARDINAL.
pub struct EntityRecognizer {
    pattern: Regex,
}

impl EntityRecognizer {
    pub fn new() -> Result<Self> {
        // Alternatives are tried left to right, so more specific labels come first.
        let source = format!(
            r"\b(?:(?P<money>{NUMBER}\s+(?:dollar|euro|pound|usd|eur|gbp|yen|cent))|(?P<percent>{NUMBER}\s+(?:percent|pct))|(?P<date>(?:{MONTHS})(?:\s+\d{{1,2}})?(?:\s+\d{{4}})?|(?:1\d|20)\d{{2}})|(?P<ordinal>\d+(?:st|nd|rd|th))|(?P<cardinal>{NUMBER}))\b"
        );
        let pattern = Regex::new(&source)
            .map_err(|e| DocmineError::Other(format!("invalid regex: {e}")))?;
        Ok(Self { pattern })
    }

    /// Find entity mentions in `text`, in order of appearance.
    #[must_use]
    pub fn recognize(&self, text: &str) -> Vec<EntityMention> {
        const LABELS: [(&str, &str); 5] = [
            ("money", "MONEY"),
            ("percent", "PERCENT"),
            ("date", "DATE"),
            ("ordinal", "ORDINAL"),
            ("cardinal", "CARDINAL"),
        ];
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                LABELS.iter().find_map(|(group, label)| {
                    caps.name(group).map(|m| EntityMention {
                        text: m.as_str().to_string(),
                        label: (*label).to_string(),
                    })
                })
            })
            .collect()
    }
}
