//! Per-record structuring: header, segmentation, classification, mentions.
use std::collections::BTreeSet;

use tracing::debug;

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::text::strip_prefix_ignore_case;
use crate::types::{Identifier, Item, RawRecord, RecordShape, StructuredRecord};

use super::action::ActionClassifier;
use super::header::HeaderStripper;
use super::mentions::{dedupe_references, AmountExtractor, ReferenceExtractor};
use super::segment::{ItemSegmenter, Segments, TailSplitter};

/// Decides between a global decision and a sequence of item decisions.
pub struct RecordClassifier;

impl RecordClassifier {
    /// Returns each item's own action when at least one item opens with an
    /// action verb (a sequence record), or `None` for a global record.
    pub fn item_actions(items: &[Item]) -> Option<Vec<Option<String>>> {
        let actions: Vec<Option<String>> = items
            .iter()
            .map(|item| ActionClassifier::classify(&item.text))
            .collect();
        actions.iter().any(Option::is_some).then_some(actions)
    }
}

/// Extracts the action and its object from the head of a global record.
pub struct SubjectExtractor<'a> {
    organ_headers: &'a [String],
}

impl<'a> SubjectExtractor<'a> {
    pub fn new(organ_headers: &'a [String]) -> Self {
        Self { organ_headers }
    }

    /// Returns `(action, subject)`.
    ///
    /// Without a recognized action the whole head becomes the subject.
    pub fn extract(&self, head: &str) -> (Option<String>, Option<String>) {
        let mut head = head.trim();
        for organ in self.organ_headers {
            if let Some(rest) = strip_prefix_ignore_case(head, organ) {
                head = rest.trim_start_matches([' ', ',']);
            }
        }

        match ActionClassifier::match_leading(head) {
            Some(m) => {
                let subject = m.rest.trim().trim_start_matches(',').trim_end_matches(':');
                (Some(m.action.token()), non_empty(subject))
            }
            None => (None, non_empty(head.trim_end_matches(':'))),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Turns raw records into structured records.
pub struct RecordParser {
    organ_headers: Vec<String>,
    tail_splitter: TailSplitter,
}

impl RecordParser {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            organ_headers: config.organ_headers.clone(),
            tail_splitter: TailSplitter::new(config.tail_min_head_words),
        }
    }

    /// Structures a single raw record.
    ///
    /// Fails only when the record's identifier is malformed; every other
    /// irregularity degrades into a simpler shape.
    pub fn parse(&self, raw: &RawRecord) -> Result<StructuredRecord> {
        let id: Identifier = raw.id.parse()?;

        let (organ, body) = HeaderStripper::new(&self.organ_headers).strip(&raw.text_raw);
        let segments = ItemSegmenter::segment(body);

        let (actions, shape) = match RecordClassifier::item_actions(&segments.items) {
            Some(item_actions) => Self::build_sequence(segments, item_actions),
            None => self.build_global(segments),
        };

        let mut references = Vec::new();
        let mut amounts = BTreeSet::new();
        for span in spans(&shape) {
            references.extend(ReferenceExtractor::extract(span));
            amounts.extend(AmountExtractor::extract(span));
        }

        debug!(
            id = %id,
            sequence = shape.is_sequence(),
            actions = ?actions,
            references = references.len(),
            "structured record"
        );

        Ok(StructuredRecord {
            id,
            datum: raw.datum,
            organ: organ.map(str::to_string),
            actions,
            shape,
            references_out: dedupe_references(references),
            references_in: Vec::new(),
            amounts,
        })
    }

    fn build_sequence(
        segments: Segments,
        item_actions: Vec<Option<String>>,
    ) -> (BTreeSet<String>, RecordShape) {
        let mut actions = BTreeSet::new();
        let items = segments
            .items
            .into_iter()
            .zip(item_actions)
            .map(|(mut item, action)| {
                if let Some(action) = &action {
                    actions.insert(action.clone());
                }
                item.action = action;
                item
            })
            .collect();

        let shape = RecordShape::Sequence {
            head: non_empty(&segments.head),
            items,
        };
        (actions, shape)
    }

    fn build_global(&self, segments: Segments) -> (BTreeSet<String>, RecordShape) {
        let (action, subject) = SubjectExtractor::new(&self.organ_headers).extract(&segments.head);

        let mut items = segments.items;
        let tail = self.tail_splitter.split(&mut items);

        let shape = RecordShape::Global {
            subject,
            items,
            tail,
        };
        (action.into_iter().collect(), shape)
    }
}

/// Free-text spans searched for references and amounts, in document order.
fn spans(shape: &RecordShape) -> Vec<&str> {
    let mut spans = Vec::new();
    match shape {
        RecordShape::Global {
            subject,
            items,
            tail,
        } => {
            spans.extend(subject.as_deref());
            spans.extend(items.iter().map(|i| i.text.as_str()));
            spans.extend(tail.as_deref());
        }
        RecordShape::Sequence { head, items } => {
            spans.extend(head.as_deref());
            spans.extend(items.iter().map(|i| i.text.as_str()));
        }
    }
    spans
}

