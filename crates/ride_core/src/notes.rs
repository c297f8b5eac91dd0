//! Keyword classification of free-text rider notes.
//!
//! Matching is a case-insensitive substring test against fixed vocabularies, so
//! "helpful" counts as "help". Categories are independent; one note can hit several.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::{NotesAnalysis, NotesRejection, NotesValidation};

/// Longest note accepted, counted in Unicode scalar values (`char`s), not bytes
/// or UTF-16 units.
pub const MAX_NOTE_CHARS: usize = 200;

pub const ACCESSIBILITY_KEYWORDS: [&str; 11] = [
    "wheelchair",
    "accessible",
    "disability",
    "disabled",
    "mobility",
    "assistance",
    "assist",
    "help",
    "cane",
    "walker",
    "aid",
];

pub const SPECIAL_NEEDS_KEYWORDS: [&str; 14] = [
    "car seat",
    "carseat",
    "baby",
    "child",
    "infant",
    "pet",
    "dog",
    "cat",
    "animal",
    "luggage",
    "baggage",
    "suitcase",
    "groceries",
    "shopping",
];

pub const DISPATCH_FLAG_KEYWORDS: [&str; 12] = [
    "urgent",
    "emergency",
    "medical",
    "hospital",
    "doctor",
    "appointment",
    "rush",
    "hurry",
    "quick",
    "fast",
    "asap",
    "immediately",
];

const DISALLOWED_WORDS: [&str; 2] = ["inappropriate", "offensive"];

const SUGGESTIONS: [&str; 6] = [
    "I have luggage",
    "I need help with groceries",
    "I have a car seat",
    "I need wheelchair accessibility",
    "I have a pet with me",
    "Please call when you arrive",
];

fn matching(text: &str, vocabulary: &[&'static str]) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    vocabulary
        .iter()
        .copied()
        .filter(|keyword| lowered.contains(*keyword))
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NotesAnalyzer;

impl NotesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> NotesAnalysis {
        let analysis = NotesAnalysis {
            dispatch_flags: collect(text, &DISPATCH_FLAG_KEYWORDS),
            accessibility_needed: !matching(text, &ACCESSIBILITY_KEYWORDS).is_empty(),
            special_needs: collect(text, &SPECIAL_NEEDS_KEYWORDS),
        };
        debug!(
            flags = analysis.dispatch_flags.len(),
            accessibility = analysis.accessibility_needed,
            special_needs = analysis.special_needs.len(),
            "analyzed notes"
        );
        analysis
    }

    /// Length is checked first, then disallowed content.
    pub fn validate(&self, text: &str) -> NotesValidation {
        let length = text.chars().count();
        if length > MAX_NOTE_CHARS {
            return NotesValidation::rejected(NotesRejection::TooLong {
                limit: MAX_NOTE_CHARS,
                actual: length,
            });
        }
        if let Some(word) = matching(text, &DISALLOWED_WORDS).first() {
            return NotesValidation::rejected(NotesRejection::DisallowedContent {
                word: word.to_string(),
            });
        }
        NotesValidation::accepted()
    }

    pub fn suggestions(&self) -> Vec<String> {
        SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }
}

fn collect(text: &str, vocabulary: &[&'static str]) -> BTreeSet<String> {
    matching(text, vocabulary).into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn wheelchair_and_car_seat() {
        let analysis = NotesAnalyzer.analyze("I need wheelchair assistance and have a car seat");
        assert!(analysis.accessibility_needed);
        assert!(analysis.special_needs.contains("car seat"));
        assert!(analysis.dispatch_flags.is_empty());
    }

    #[test]
    fn matching_ignores_case_and_collects_every_hit() {
        let analysis =
            NotesAnalyzer.analyze("URGENT: Hospital appointment, bringing my DOG and a Suitcase");
        assert!(!analysis.accessibility_needed);
        assert_eq!(analysis.dispatch_flags, set(&["appointment", "hospital", "urgent"]));
        assert_eq!(analysis.special_needs, set(&["dog", "suitcase"]));
    }

    #[test]
    fn substrings_count() {
        // "helpful" contains "help", "scattered" contains "cat".
        let analysis = NotesAnalyzer.analyze("Driver was helpful with scattered bags");
        assert!(analysis.accessibility_needed);
        assert_eq!(analysis.special_needs, set(&["cat"]));
    }

    #[test]
    fn plain_note_matches_nothing() {
        assert_eq!(NotesAnalyzer.analyze("Gate code is 4412"), NotesAnalysis::default());
    }

    #[test]
    fn long_notes_are_rejected() {
        let validation = NotesAnalyzer.validate(&"a".repeat(250));
        assert!(!validation.valid);
        assert_eq!(
            validation.reason,
            Some(NotesRejection::TooLong {
                limit: 200,
                actual: 250
            })
        );
        assert!(validation
            .reason
            .map(|r| r.to_string().contains("200 characters"))
            .unwrap_or(false));
    }

    #[test]
    fn exactly_two_hundred_is_fine() {
        assert!(NotesAnalyzer.validate(&"é".repeat(200)).valid);
        // Two UTF-16 units each, still one char.
        assert!(NotesAnalyzer.validate(&"🚕".repeat(200)).valid);
        assert!(!NotesAnalyzer.validate(&"🚕".repeat(201)).valid);
    }

    #[test]
    fn disallowed_words_are_rejected() {
        let validation = NotesAnalyzer.validate("This is OFFENSIVE");
        assert!(!validation.valid);
        assert_eq!(
            validation.reason,
            Some(NotesRejection::DisallowedContent {
                word: "offensive".into()
            })
        );
        assert!(NotesAnalyzer.validate("Please ring the bell").valid);
    }

    #[test]
    fn suggestions_are_fixed() {
        let suggestions = NotesAnalyzer.suggestions();
        assert_eq!(suggestions.len(), 6);
        assert_eq!(suggestions[0], "I have luggage");
        assert_eq!(suggestions, NotesAnalyzer::new().suggestions());
    }
}
