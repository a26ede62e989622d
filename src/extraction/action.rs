//! Recognition of the action verb that opens a decision.
use std::fmt;

use crate::text::{is_word_char, strip_leading_noise, strip_prefix_ignore_case};

/// Negation particle written together with the verb (`neschvaluje`).
const NEGATION: &str = "ne";

/// Canonical action verbs a council decision can open with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionVerb {
    UdelujePredbeznySouhlas,
    UdelujeVyjimku,
    BereNaVedomi,
    Schvaluje,
    Souhlasi,
    Uklada,
    Revokuje,
    Vydava,
    Stanovuje,
    Doporucuje,
    Odklada,
    Jmenuje,
    Poveruje,
    Sveruje,
    Urcuje,
    Zajisti,
    Vyhovuje,
    Rozhoduje,
    Projednava,
    Konstatuje,
    Potvrzuje,
    Navrhuje,
    Nominuje,
    Voli,
    StahujeBod,
    Zrizuje,
    Deleguje,
    Poskytuje,
    SeZavazuje,
    PrijimaDotaci,
}

impl ActionVerb {
    /// Returns the canonical lower-case form used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionVerb::UdelujePredbeznySouhlas => "uděluje předběžný souhlas",
            ActionVerb::UdelujeVyjimku => "uděluje výjimku",
            ActionVerb::BereNaVedomi => "bere na vědomí",
            ActionVerb::Schvaluje => "schvaluje",
            ActionVerb::Souhlasi => "souhlasí",
            ActionVerb::Uklada => "ukládá",
            ActionVerb::Revokuje => "revokuje",
            ActionVerb::Vydava => "vydává",
            ActionVerb::Stanovuje => "stanovuje",
            ActionVerb::Doporucuje => "doporučuje",
            ActionVerb::Odklada => "odkládá",
            ActionVerb::Jmenuje => "jmenuje",
            ActionVerb::Poveruje => "pověřuje",
            ActionVerb::Sveruje => "svěřuje",
            ActionVerb::Urcuje => "určuje",
            ActionVerb::Zajisti => "zajistí",
            ActionVerb::Vyhovuje => "vyhovuje",
            ActionVerb::Rozhoduje => "rozhoduje",
            ActionVerb::Projednava => "projednává",
            ActionVerb::Konstatuje => "konstatuje",
            ActionVerb::Potvrzuje => "potvrzuje",
            ActionVerb::Navrhuje => "navrhuje",
            ActionVerb::Nominuje => "nominuje",
            ActionVerb::Voli => "volí",
            ActionVerb::StahujeBod => "stahuje bod",
            ActionVerb::Zrizuje => "zřizuje",
            ActionVerb::Deleguje => "deleguje",
            ActionVerb::Poskytuje => "poskytuje",
            ActionVerb::SeZavazuje => "se zavazuje",
            ActionVerb::PrijimaDotaci => "přijímá dotaci",
        }
    }
}

/// Surface phrases and the verb each one normalizes to.
///
/// Ordered most specific first: a phrase never precedes a longer phrase it is
/// a prefix of, so the first hit in table order is the correct one. Variant
/// spellings (`rozhodla`, `byla seznámena`, `projednala`) map onto the
/// canonical present-tense verb.
pub const PHRASE_TABLE: &[(&str, ActionVerb)] = &[
    ("uděluje předběžný souhlas", ActionVerb::UdelujePredbeznySouhlas),
    ("uděluje výjimku", ActionVerb::UdelujeVyjimku),
    ("byla seznámena", ActionVerb::BereNaVedomi),
    ("bere na vědomí", ActionVerb::BereNaVedomi),
    ("přijímá dotaci", ActionVerb::PrijimaDotaci),
    ("stahuje bod", ActionVerb::StahujeBod),
    ("se zavazuje", ActionVerb::SeZavazuje),
    ("schvaluje", ActionVerb::Schvaluje),
    ("souhlasí", ActionVerb::Souhlasi),
    ("ukládá", ActionVerb::Uklada),
    ("revokuje", ActionVerb::Revokuje),
    ("vydává", ActionVerb::Vydava),
    ("stanovuje", ActionVerb::Stanovuje),
    ("doporučuje", ActionVerb::Doporucuje),
    ("odkládá", ActionVerb::Odklada),
    ("jmenuje", ActionVerb::Jmenuje),
    ("pověřuje", ActionVerb::Poveruje),
    ("svěřuje", ActionVerb::Sveruje),
    ("určuje", ActionVerb::Urcuje),
    ("zajistí", ActionVerb::Zajisti),
    ("vyhovuje", ActionVerb::Vyhovuje),
    ("rozhoduje", ActionVerb::Rozhoduje),
    ("rozhodla", ActionVerb::Rozhoduje),
    ("projednává", ActionVerb::Projednava),
    ("projednala", ActionVerb::Projednava),
    ("konstatuje", ActionVerb::Konstatuje),
    ("potvrzuje", ActionVerb::Potvrzuje),
    ("navrhuje", ActionVerb::Navrhuje),
    ("nominuje", ActionVerb::Nominuje),
    ("volí", ActionVerb::Voli),
    ("zřizuje", ActionVerb::Zrizuje),
    ("deleguje", ActionVerb::Deleguje),
    ("poskytuje", ActionVerb::Poskytuje),
];

/// A recognized action, possibly negated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Action {
    pub verb: ActionVerb,
    pub negated: bool,
}

impl Action {
    /// Normalized output token, e.g. `schvaluje` or `neschvaluje`.
    pub fn token(&self) -> String {
        if self.negated {
            format!("{}{}", NEGATION, self.verb.as_str())
        } else {
            self.verb.as_str().to_string()
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// An action found at the start of a text, with the text that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionMatch<'t> {
    pub action: Action,
    pub rest: &'t str,
}

/// Classifies the leading action phrase of a text span.
pub struct ActionClassifier;

impl ActionClassifier {
    /// Matches an action phrase at the very start of `text`.
    ///
    /// Leading whitespace, invisible characters and stray punctuation are
    /// skipped first. Only a leading occurrence counts.
    pub fn match_leading(text: &str) -> Option<ActionMatch<'_>> {
        let text = strip_leading_noise(text);

        if let Some(after_negation) = strip_prefix_ignore_case(text, NEGATION) {
            if let Some((verb, rest)) = Self::match_phrase(after_negation) {
                return Some(ActionMatch {
                    action: Action {
                        verb,
                        negated: true,
                    },
                    rest,
                });
            }
        }

        let (verb, rest) = Self::match_phrase(text)?;
        Some(ActionMatch {
            action: Action {
                verb,
                negated: false,
            },
            rest,
        })
    }

    /// Returns the normalized action token opening `text`, if any.
    pub fn classify(text: &str) -> Option<String> {
        Self::match_leading(text).map(|m| m.action.token())
    }

    fn match_phrase(text: &str) -> Option<(ActionVerb, &str)> {
        PHRASE_TABLE.iter().find_map(|(phrase, verb)| {
            let rest = strip_phrase(text, phrase)?;
            Some((*verb, rest))
        })
    }
}

/// Strips a (possibly multi-word) phrase from the start of `text`.
///
/// Words are compared case-insensitively, any whitespace run (line breaks
/// included) separates them, and the phrase must end on a word boundary.
fn strip_phrase<'t>(text: &'t str, phrase: &str) -> Option<&'t str> {
    let mut rest = text;
    for (i, word) in phrase.split(' ').enumerate() {
        if i > 0 {
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            rest = trimmed;
        }
        rest = strip_prefix_ignore_case(rest, word)?;
    }
    match rest.chars().next() {
        Some(c) if is_word_char(c) => None,
        _ => Some(rest),
    }
}
