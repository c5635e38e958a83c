//! Extraction of the six canonical sections from generated markdown.
//!
//! Matching is best-effort: a header that never appears simply yields an
//! empty section. Nothing in here returns an error.

use crate::domain::SectionType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Section contents keyed by type. Iteration follows the canonical section
/// order because `SectionType` orders by its variant position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSections(BTreeMap<SectionType, String>);

impl ParsedSections {
    #[must_use]
    pub fn get(&self, section: SectionType) -> &str {
        self.0.get(&section).map_or("", String::as_str)
    }

    pub fn set(&mut self, section: SectionType, content: String) {
        self.0.insert(section, content);
    }

    /// True when the given section was found and carries text.
    #[must_use]
    pub fn has(&self, section: SectionType) -> bool {
        !self.get(section).trim().is_empty()
    }

    /// Non-empty sections in canonical order.
    pub fn non_empty(&self) -> impl Iterator<Item = (SectionType, &str)> {
        SectionType::ALL
            .into_iter()
            .filter(|s| self.has(*s))
            .map(|s| (s, self.get(s)))
    }

    /// True when no section carries any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        SectionType::ALL.iter().all(|s| !self.has(*s))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn section_regex(section: SectionType) -> &'static Regex {
    // Lazy capture up to the next `##` header or end of text.
    match section {
        SectionType::Problem => {
            static RE: OnceLock<Regex> = OnceLock::new();
            get_regex(
                &RE,
                r"(?is)##\s*problem\s+statement\s*\n(.*?)(?:\n##|\z)",
            )
        }
        SectionType::Users => {
            static RE: OnceLock<Regex> = OnceLock::new();
            get_regex(&RE, r"(?is)##\s*target\s+users\s*\n(.*?)(?:\n##|\z)")
        }
        SectionType::Features => {
            static RE: OnceLock<Regex> = OnceLock::new();
            get_regex(&RE, r"(?is)##\s*core\s+features\s*\n(.*?)(?:\n##|\z)")
        }
        SectionType::Workflow => {
            static RE: OnceLock<Regex> = OnceLock::new();
            get_regex(&RE, r"(?is)##\s*user\s+workflow\s*\n(.*?)(?:\n##|\z)")
        }
        SectionType::Risks => {
            static RE: OnceLock<Regex> = OnceLock::new();
            // Tolerates "Risk"/"Risks", "&" or "and", "Challenge"/"Challenges".
            get_regex(
                &RE,
                r"(?is)##\s*risks?\s*(?:&|and)?\s*challenges?\s*\n(.*?)(?:\n##|\z)",
            )
        }
        SectionType::Metrics => {
            static RE: OnceLock<Regex> = OnceLock::new();
            get_regex(&RE, r"(?is)##\s*success\s+metrics\s*\n(.*?)(?:\n##|\z)")
        }
    }
}

/// Scans generated text for the six canonical `## Header` blocks.
///
/// Every section type is present in the result; those whose header was not
/// found are empty strings.
#[must_use]
pub fn extract_sections(content: &str) -> ParsedSections {
    let mut sections = ParsedSections::default();

    for section in SectionType::ALL {
        let text = section_regex(section)
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        sections.set(section, text);
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "Here is the analysis you asked for.\n\n\
## Problem Statement\nSmall teams lose track of ideas.\n\n\
## Target Users\nEarly-stage founders and product managers.\n\n\
## Core Features\n- Capture\n- Expand\n- Share\n\n\
## User Workflow\nSubmit an idea, review the expansion, iterate.\n\n\
## Risks & Challenges\nLLM output quality varies.\n\n\
## Success Metrics\nWeekly active users and expansion completion rate.\n";

    #[test]
    fn extracts_all_six_sections() {
        let sections = extract_sections(FULL_RESPONSE);

        for section in SectionType::ALL {
            assert!(sections.has(section), "missing section {section}");
        }
        assert_eq!(sections.get(SectionType::Problem), "Small teams lose track of ideas.");
        assert_eq!(
            sections.get(SectionType::Features),
            "- Capture\n- Expand\n- Share"
        );
    }

    #[test]
    fn order_is_canonical_regardless_of_source_order() {
        let reversed = "## Success Metrics\nretention\n\n\
## Risks & Challenges\nchurn\n\n\
## User Workflow\nflow\n\n\
## Core Features\nfeatures\n\n\
## Target Users\nusers\n\n\
## Problem Statement\nproblem\n";

        let sections = extract_sections(reversed);
        let order: Vec<SectionType> = sections.non_empty().map(|(s, _)| s).collect();
        assert_eq!(order, SectionType::ALL.to_vec());
        assert_eq!(sections.get(SectionType::Metrics), "retention");
    }

    #[test]
    fn missing_headers_yield_empty_sections() {
        let partial = "## Problem Statement\nonly the problem here\n";
        let sections = extract_sections(partial);

        assert!(sections.has(SectionType::Problem));
        assert!(!sections.has(SectionType::Users));
        assert_eq!(sections.non_empty().count(), 1);
    }

    #[test]
    fn no_headers_is_not_an_error() {
        let sections = extract_sections("The model ignored the format entirely.");
        assert!(sections.is_empty());
        assert_eq!(sections.non_empty().count(), 0);
    }

    #[test]
    fn risks_header_variants() {
        for header in [
            "## Risks & Challenges",
            "## Risks and Challenges",
            "## Risk & Challenge",
            "## risks & challenges",
        ] {
            let text = format!("{header}\nsome risk\n");
            let sections = extract_sections(&text);
            assert!(sections.has(SectionType::Risks), "failed for {header}");
        }
    }

    #[test]
    fn header_matching_is_case_insensitive() {
        let text = "## PROBLEM STATEMENT\nshouting\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(SectionType::Problem), "shouting");
    }

    #[test]
    fn content_stops_at_next_header() {
        let text = "## Problem Statement\nfirst\n## Target Users\nsecond\n";
        let sections = extract_sections(text);
        assert_eq!(sections.get(SectionType::Problem), "first");
        assert_eq!(sections.get(SectionType::Users), "second");
    }

    #[test]
    fn json_round_trip_preserves_contents() {
        let sections = extract_sections(FULL_RESPONSE);
        let json = sections.to_json().unwrap();
        let restored = ParsedSections::from_json(&json).unwrap();
        assert_eq!(restored, sections);
    }
}
