//! Reference and amount extraction from free-text spans.
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::text::collapse_whitespace;
use crate::types::{Identifier, Reference};

/// Fully-qualified identifier anywhere in the text.
static EXPLICIT_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:RM|ZM)/\d+/\d+/\d+").expect("valid explicit reference regex"));

/// Shorthand `sequence/meeting` pair, only after the word "usnesení" or "usn.".
static IMPLICIT_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:usnesení|usn\.)\s*(?:č\.?)?\s*(\d{1,4}/\d{1,3})")
        .expect("valid implicit reference regex")
});

/// `2.\n000 Kč`: thousands group pushed onto the next line after a dot.
static SPLIT_DOTTED_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d)\.[ \t]*\n\s*(\d{3})\s*Kč").expect("valid dotted split amount regex")
});

/// `2\n000 Kč`: thousands group pushed onto the next line.
static SPLIT_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d)[ \t]*\n\s*(\d{3})\s*Kč").expect("valid split amount regex")
});

/// Amount in crowns: space-, dot- or nbsp-grouped thousands, or a plain digit run.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\d{1,3}(?:[ .\u{a0}]\d{3})+|\d+)\s*Kč\b").expect("valid amount regex")
});

/// Finds mentions of other resolutions.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    /// Returns every explicit and implicit mention in `text`, in text order.
    ///
    /// Explicit mentions resolve to themselves; implicit ones are left for
    /// the corpus-wide resolver.
    pub fn extract(text: &str) -> Vec<Reference> {
        let mut found: Vec<(usize, Reference)> = Vec::new();

        for m in EXPLICIT_REF_RE.find_iter(text) {
            if m.as_str().parse::<Identifier>().is_ok() {
                found.push((m.start(), Reference::explicit(m.as_str())));
            }
        }

        for caps in IMPLICIT_REF_RE.captures_iter(text) {
            let Some(pair) = caps.get(1) else { continue };
            // "usnesení č. 12/3/2024" is a truncated full identifier, not a pair.
            let continues = text[pair.end()..]
                .chars()
                .next()
                .is_some_and(|c| c == '/' || c.is_ascii_digit());
            if continues {
                continue;
            }
            found.push((pair.start(), Reference::implicit(pair.as_str())));
        }

        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, r)| r).collect()
    }
}

/// Keeps the first reference for each raw mention, preserving order.
pub fn dedupe_references(refs: Vec<Reference>) -> Vec<Reference> {
    let mut seen = HashSet::new();
    refs.into_iter()
        .filter(|r| seen.insert(r.raw.clone()))
        .collect()
}

/// Finds monetary amounts.
pub struct AmountExtractor;

impl AmountExtractor {
    /// Rejoins amounts whose thousands group was pushed onto the next line.
    ///
    /// Applying it to already normalized text changes nothing.
    pub fn normalize(text: &str) -> String {
        let text = SPLIT_DOTTED_AMOUNT_RE.replace_all(text, "${1}.${2} Kč");
        SPLIT_AMOUNT_RE.replace_all(&text, "${1} ${2} Kč").into_owned()
    }

    /// Returns the distinct amounts in `text`, sorted.
    pub fn extract(text: &str) -> BTreeSet<String> {
        let normalized = Self::normalize(text);
        AMOUNT_RE
            .find_iter(&normalized)
            .map(|m| collapse_whitespace(m.as_str()))
            .collect()
    }
}
