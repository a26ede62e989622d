//! Pattern-based structuring of raw resolution text.
//!
//! Each stage works on a single record and shares no state with the others,
//! so records can be structured in any order.
mod action;
mod header;
mod mentions;
mod record_parser;
mod segment;

pub use action::{Action, ActionClassifier, ActionMatch, ActionVerb, PHRASE_TABLE};
pub use header::HeaderStripper;
pub use mentions::{dedupe_references, AmountExtractor, ReferenceExtractor};
pub use record_parser::{RecordClassifier, RecordParser, SubjectExtractor};
pub use segment::{ItemSegmenter, Segments, TailSplitter};
