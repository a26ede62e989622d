//! Splitting a record body into its head, lettered items and trailing text.
use std::sync::LazyLock;

use regex::Regex;

use crate::text::word_count;
use crate::types::Item;

/// Item marker: a lowercase letter and `)` at the start of the text or of a line.
static ITEM_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\n)([a-z])\)\s+").expect("valid item marker regex"));

/// A line break followed by a lowercase word opens trailing commentary.
static TAIL_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[a-záčďéěíňóřšťúůýž]").expect("valid tail break regex"));

/// Body text cut into the part before the first item and the items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    pub head: String,
    pub items: Vec<Item>,
}

/// Detects `a)`, `b)`, ... markers and cuts the text at them.
pub struct ItemSegmenter;

impl ItemSegmenter {
    /// Labels are kept verbatim; their sequence is not validated.
    pub fn segment(text: &str) -> Segments {
        let markers: Vec<_> = ITEM_MARKER_RE.captures_iter(text).collect();
        let Some(first) = markers.first() else {
            return Segments {
                head: text.trim().to_string(),
                items: Vec::new(),
            };
        };

        let head = text[..first.get(0).map_or(0, |m| m.start())].trim().to_string();

        let items = markers
            .iter()
            .enumerate()
            .filter_map(|(i, caps)| {
                let whole = caps.get(0)?;
                let label = caps.get(1)?.as_str().chars().next()?;
                let end = markers
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(text.len(), |m| m.start());
                Some(Item::new(label, text[whole.end()..end].trim()))
            })
            .collect();

        Segments { head, items }
    }
}

/// Separates commentary appended after the last item of a global record.
pub struct TailSplitter {
    min_head_words: usize,
}

impl TailSplitter {
    pub fn new(min_head_words: usize) -> Self {
        Self { min_head_words }
    }

    /// Truncates the last item at the first line break followed by a
    /// lowercase letter and returns the cut-off remainder.
    ///
    /// The split is skipped when the part left in the item would have fewer
    /// than `min_head_words` words.
    pub fn split(&self, items: &mut [Item]) -> Option<String> {
        let last = items.last_mut()?;
        let cut = TAIL_BREAK_RE.find(&last.text)?.start();

        let head = last.text[..cut].trim().to_string();
        if word_count(&head) < self.min_head_words {
            return None;
        }

        let tail = last.text[cut..].trim().to_string();
        last.text = head;
        Some(tail)
    }
}

impl Default for TailSplitter {
    fn default() -> Self {
        Self::new(3)
    }
}
