use std::collections::{HashMap, HashSet};

use crate::types::{Identifier, StructuredRecord};

/// Immutable lookup tables over the whole corpus.
///
/// Building the context is the barrier between per-record structuring and
/// resolution: it needs every identifier that exists in the corpus.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    /// `(sequence, meeting)` to every identifier carrying that pair, ascending
    /// by year (then by identifier).
    by_key: HashMap<(u32, u32), Vec<Identifier>>,
    known: HashSet<Identifier>,
}

impl ResolutionContext {
    /// Indexes every record of the corpus.
    pub fn build(records: &[StructuredRecord]) -> Self {
        Self::from_identifiers(records.iter().map(|r| r.id.clone()))
    }

    /// Indexes a bare list of identifiers.
    pub fn from_identifiers(ids: impl IntoIterator<Item = Identifier>) -> Self {
        let mut by_key: HashMap<(u32, u32), Vec<Identifier>> = HashMap::new();
        let mut known = HashSet::new();

        for id in ids {
            if !known.insert(id.clone()) {
                continue;
            }
            by_key.entry(id.short_key()).or_default().push(id);
        }

        for candidates in by_key.values_mut() {
            candidates.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.cmp(b)));
        }

        Self { by_key, known }
    }

    /// All identifiers carrying the given `(sequence, meeting)` pair.
    pub fn candidates(&self, sequence: u32, meeting: u32) -> &[Identifier] {
        self.by_key
            .get(&(sequence, meeting))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Picks the record a shorthand mention in `source` refers to.
    ///
    /// The candidate with the latest year not after the source's year wins.
    /// Among candidates of that year, one from the source's own body is
    /// preferred; otherwise the greatest identifier is taken.
    pub fn nearest(&self, sequence: u32, meeting: u32, source: &Identifier) -> Option<&Identifier> {
        let candidates = self.candidates(sequence, meeting);
        let year = candidates
            .iter()
            .map(|c| c.year)
            .filter(|year| *year <= source.year)
            .max()?;

        let same_year = candidates.iter().filter(|c| c.year == year);
        same_year
            .clone()
            .find(|c| c.body == source.body)
            .or_else(|| same_year.last())
    }

    /// Returns `true` if the identifier belongs to the corpus.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.known.contains(id)
    }

    /// Number of distinct identifiers indexed.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
