use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::UsneseniError;

static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(RM|ZM)/(\d+)/(\d+)/(\d+)$").expect("valid identifier regex")
});

/// Issuing body encoded in the first component of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BodyCode {
    /// Rada města (city council).
    #[serde(rename = "RM")]
    Rm,
    /// Zastupitelstvo města (city assembly).
    #[serde(rename = "ZM")]
    Zm,
}

#[allow(clippy::should_implement_trait)]
impl BodyCode {
    /// Returns the textual code used inside identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyCode::Rm => "RM",
            BodyCode::Zm => "ZM",
        }
    }

    /// Parses a body code, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<BodyCode> {
        match s {
            "RM" => Some(BodyCode::Rm),
            "ZM" => Some(BodyCode::Zm),
            _ => None,
        }
    }
}

/// Fully-qualified resolution identifier, rendered `RM/1853/60/2025`.
///
/// Field order doubles as the corpus iteration order: body, then year,
/// meeting and sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    pub body: BodyCode,
    pub year: u32,
    pub meeting: u32,
    pub sequence: u32,
}

impl Identifier {
    pub fn new(body: BodyCode, sequence: u32, meeting: u32, year: u32) -> Self {
        Self {
            body,
            year,
            meeting,
            sequence,
        }
    }

    /// The `(sequence, meeting)` pair a shorthand mention carries.
    pub fn short_key(&self) -> (u32, u32) {
        (self.sequence, self.meeting)
    }

    /// File stem used when persisting the record, e.g. `RM-1853-60-2025`.
    pub fn file_stem(&self) -> String {
        self.to_string().replace('/', "-")
    }
}

/// Returns `true` if the text is a syntactically valid identifier.
pub fn is_valid_identifier(s: &str) -> bool {
    s.parse::<Identifier>().is_ok()
}

impl FromStr for Identifier {
    type Err = UsneseniError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || UsneseniError::MalformedIdentifier(s.to_string());
        let caps = IDENTIFIER_RE.captures(s).ok_or_else(malformed)?;
        let body = BodyCode::from_str(&caps[1]).ok_or_else(malformed)?;
        let sequence = caps[2].parse().map_err(|_| malformed())?;
        let meeting = caps[3].parse().map_err(|_| malformed())?;
        let year = caps[4].parse().map_err(|_| malformed())?;
        Ok(Identifier::new(body, sequence, meeting, year))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.body.as_str(),
            self.sequence,
            self.meeting,
            self.year
        )
    }
}

impl TryFrom<String> for Identifier {
    type Error = UsneseniError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

/// One resolution as handed over by the ingestion step.
///
/// The identifier is kept as text so that malformed records can be reported
/// and skipped instead of failing deserialization of the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub datum: Option<NaiveDate>,
    #[serde(default)]
    pub organ: Option<String>,
    pub text_raw: String,
}

/// A lettered sub-item, e.g. `a) schvaluje ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub label: char,
    pub text: String,
    /// Action carried by the item itself; only set for sequence records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Item {
    pub fn new(label: char, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
            action: None,
        }
    }
}

/// Structural shape of a resolution, decided once by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordShape {
    /// Type A: one action governs the record, items enumerate its subject.
    Global {
        subject: Option<String>,
        items: Vec<Item>,
        tail: Option<String>,
    },
    /// Type B: every item carries its own decision.
    Sequence {
        head: Option<String>,
        items: Vec<Item>,
    },
}

impl RecordShape {
    pub fn items(&self) -> &[Item] {
        match self {
            RecordShape::Global { items, .. } | RecordShape::Sequence { items, .. } => items,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            RecordShape::Global { subject, .. } => subject.as_deref(),
            RecordShape::Sequence { .. } => None,
        }
    }

    pub fn tail(&self) -> Option<&str> {
        match self {
            RecordShape::Global { tail, .. } => tail.as_deref(),
            RecordShape::Sequence { .. } => None,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, RecordShape::Sequence { .. })
    }
}

/// Whether a mention names its target fully or only by `sequence/meeting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Explicit,
    Implicit,
}

/// A mention of another resolution found in the text.
///
/// `resolved` holds the target as written: the verbatim `raw` text for
/// explicit mentions, the canonical identifier for resolved implicit ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub raw: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
    pub resolved: Option<String>,
}

impl Reference {
    /// An explicit mention; it resolves to its own text.
    pub fn explicit(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            resolved: Some(raw.clone()),
            raw,
            kind: ReferenceKind::Explicit,
        }
    }

    /// A shorthand `sequence/meeting` mention awaiting resolution.
    pub fn implicit(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: ReferenceKind::Implicit,
            resolved: None,
        }
    }
}

/// Incoming edge recorded on the target of a resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingRef {
    pub from: Identifier,
    pub action: Option<String>,
}

/// A resolution after structural parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordJson", into = "RecordJson")]
pub struct StructuredRecord {
    pub id: Identifier,
    pub datum: Option<NaiveDate>,
    pub organ: Option<String>,
    pub actions: BTreeSet<String>,
    pub shape: RecordShape,
    pub references_out: Vec<Reference>,
    pub references_in: Vec<IncomingRef>,
    pub amounts: BTreeSet<String>,
}

impl StructuredRecord {
    pub fn items(&self) -> &[Item] {
        self.shape.items()
    }

    pub fn subject(&self) -> Option<&str> {
        self.shape.subject()
    }

    pub fn tail(&self) -> Option<&str> {
        self.shape.tail()
    }

    /// The action reported on incoming edges: the first in sorted order.
    pub fn primary_action(&self) -> Option<&str> {
        self.actions.iter().next().map(String::as_str)
    }
}

/// Flat wire form of a [`StructuredRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordJson {
    id: Identifier,
    #[serde(default)]
    datum: Option<NaiveDate>,
    #[serde(default)]
    organ: Option<String>,
    #[serde(rename = "type", default = "default_record_type")]
    record_type: String,
    #[serde(default)]
    actions: BTreeSet<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    head: Option<String>,
    #[serde(default)]
    items: Vec<Item>,
    #[serde(default)]
    tail: Option<String>,
    #[serde(default)]
    references_out: Vec<Reference>,
    #[serde(default)]
    references_in: Vec<IncomingRef>,
    #[serde(default)]
    amounts: BTreeSet<String>,
}

fn default_record_type() -> String {
    "A".to_string()
}

impl From<StructuredRecord> for RecordJson {
    fn from(record: StructuredRecord) -> Self {
        let (record_type, subject, head, items, tail) = match record.shape {
            RecordShape::Global {
                subject,
                items,
                tail,
            } => ("A", subject, None, items, tail),
            RecordShape::Sequence { head, items } => ("B", None, head, items, None),
        };
        RecordJson {
            id: record.id,
            datum: record.datum,
            organ: record.organ,
            record_type: record_type.to_string(),
            actions: record.actions,
            subject,
            head,
            items,
            tail,
            references_out: record.references_out,
            references_in: record.references_in,
            amounts: record.amounts,
        }
    }
}

impl From<RecordJson> for StructuredRecord {
    fn from(json: RecordJson) -> Self {
        let shape = if json.record_type == "B" {
            RecordShape::Sequence {
                head: json.head,
                items: json.items,
            }
        } else {
            RecordShape::Global {
                subject: json.subject,
                items: json.items,
                tail: json.tail,
            }
        };
        StructuredRecord {
            id: json.id,
            datum: json.datum,
            organ: json.organ,
            actions: json.actions,
            shape,
            references_out: json.references_out,
            references_in: json.references_in,
            amounts: json.amounts,
        }
    }
}

/// Counters gathered while structuring a batch of raw records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Records structured successfully.
    pub total: usize,
    /// Records without any recognized action.
    pub missing_action: usize,
    /// Records dropped because their identifier is malformed.
    pub skipped_malformed: usize,
    /// Records dropped because an earlier record has the same identifier.
    #[serde(default)]
    pub skipped_duplicate: usize,
    /// How many records carry each action.
    pub actions: BTreeMap<String, usize>,
}

/// A shorthand mention that matched no record at or before its source year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedMention {
    pub source: Identifier,
    pub raw: String,
}

/// A mention that resolved to a concrete identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub source: Identifier,
    pub raw: String,
    /// Same text as the reference's `resolved` value.
    pub target: String,
}

/// Result of resolving references across the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub total_records: usize,
    pub refs_total: usize,
    pub refs_resolved: usize,
    pub refs_unresolved: usize,
    pub unresolved_refs: Vec<UnresolvedMention>,
    /// Every resolved mention, in source order.
    #[serde(skip)]
    pub links: Vec<ResolvedLink>,
}
