use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::types::*;

use super::ResolutionContext;

/// Resolves outgoing references against a [`ResolutionContext`] and builds
/// the incoming edges on their targets.
pub struct ReferenceResolver<'a> {
    context: &'a ResolutionContext,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(context: &'a ResolutionContext) -> Self {
        Self { context }
    }

    /// Resolves a single reference made by the record `source`.
    ///
    /// Explicit references resolve to the identifier they spell out. Implicit
    /// `sequence/meeting` references resolve to the nearest record at or
    /// before the source's year. Returns `None` when nothing matches.
    ///
    /// The returned identifier is canonical and only used to find the target
    /// in the corpus; the text stored on the reference comes from
    /// `resolve_all`.
    pub fn resolve_one(&self, source: &Identifier, reference: &Reference) -> Option<Identifier> {
        match reference.kind {
            ReferenceKind::Explicit => reference.raw.parse().ok(),
            ReferenceKind::Implicit => {
                let (sequence, meeting) = parse_short_key(&reference.raw)?;
                self.context.nearest(sequence, meeting, source).cloned()
            }
        }
    }

    /// Resolves every outgoing reference of every record and rebuilds all
    /// `references_in` lists.
    ///
    /// Records are processed in identifier order regardless of their order in
    /// the slice, so the result is deterministic. Incoming edges are first
    /// collected as `(target, entry)` pairs and then merged per target, with
    /// one entry per distinct source. Running it twice yields the same result.
    pub fn resolve_all(&self, records: &mut [StructuredRecord]) -> ResolutionStats {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| records[a].id.cmp(&records[b].id));

        let mut stats = ResolutionStats {
            total_records: records.len(),
            ..ResolutionStats::default()
        };
        let mut edges: Vec<(Identifier, IncomingRef)> = Vec::new();

        for &index in &order {
            let record = &mut records[index];
            let source = record.id.clone();
            let action = record.primary_action().map(str::to_string);
            let mut targets = HashSet::new();

            for reference in &mut record.references_out {
                stats.refs_total += 1;
                let target = self.resolve_one(&source, reference);
                let resolved = target.as_ref().map(|t| resolved_text(reference, t));
                reference.resolved = resolved.clone();

                let (Some(target), Some(resolved)) = (target, resolved) else {
                    debug!(source = %source, raw = %reference.raw, "unresolved reference");
                    stats.refs_unresolved += 1;
                    stats.unresolved_refs.push(UnresolvedMention {
                        source: source.clone(),
                        raw: reference.raw.clone(),
                    });
                    continue;
                };

                stats.refs_resolved += 1;
                stats.links.push(ResolvedLink {
                    source: source.clone(),
                    raw: reference.raw.clone(),
                    target: resolved,
                });

                if self.context.contains(&target) && targets.insert(target.clone()) {
                    edges.push((
                        target,
                        IncomingRef {
                            from: source.clone(),
                            action: action.clone(),
                        },
                    ));
                }
            }
        }

        Self::merge_incoming(records, edges);

        info!(
            records = stats.total_records,
            references = stats.refs_total,
            resolved = stats.refs_resolved,
            unresolved = stats.refs_unresolved,
            "resolved references"
        );

        stats
    }

    /// Replaces every record's `references_in` with the collected edges,
    /// keeping the order in which sources were processed.
    fn merge_incoming(records: &mut [StructuredRecord], edges: Vec<(Identifier, IncomingRef)>) {
        let positions: HashMap<Identifier, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        for record in records.iter_mut() {
            record.references_in.clear();
        }

        for (target, entry) in edges {
            if let Some(&pos) = positions.get(&target) {
                records[pos].references_in.push(entry);
            }
        }
    }
}

/// Text stored in `resolved`: an explicit mention keeps its own spelling,
/// an implicit one takes the canonical identifier it matched.
fn resolved_text(reference: &Reference, target: &Identifier) -> String {
    match reference.kind {
        ReferenceKind::Explicit => reference.raw.clone(),
        ReferenceKind::Implicit => target.to_string(),
    }
}

/// Parses `"1200/55"` into `(1200, 55)`.
fn parse_short_key(raw: &str) -> Option<(u32, u32)> {
    let (sequence, meeting) = raw.split_once('/')?;
    Some((sequence.trim().parse().ok()?, meeting.trim().parse().ok()?))
}
