use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{load_config, PipelineConfig};
use crate::corpus;
use crate::errors::Result;
use crate::extraction::RecordParser;
use crate::resolution::{ReferenceResolver, ResolutionContext};
use crate::types::*;

/// Central orchestrator running the structuring and resolution stages.
pub struct Pipeline {
    config: PipelineConfig,
    parser: RecordParser,
    root: PathBuf,
}

/// Records produced by the structuring stage.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub records: Vec<StructuredRecord>,
    pub stats: ParseStats,
}

/// Summary of a structuring run over a directory.
#[derive(Debug)]
pub struct ParseSummary {
    pub stats: ParseStats,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a resolution run over a directory.
pub struct ResolveSummary {
    pub stats: ResolutionStats,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a full run: structuring followed by resolution.
pub struct RunSummary {
    pub parse: ParseStats,
    pub resolution: ResolutionStats,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Creates a pipeline from an explicit configuration.
    pub fn new(root: &Path, config: PipelineConfig) -> Self {
        let parser = RecordParser::new(&config);
        Self {
            config,
            parser,
            root: root.to_path_buf(),
        }
    }

    /// Opens a pipeline rooted at `root`, loading `.usneseni/config.json`
    /// when present.
    pub fn open(root: &Path) -> Result<Self> {
        let config = load_config(root)?;
        Ok(Self::new(root, config))
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the root the configuration was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

// ---------------------------------------------------------------------------
// In-memory stages
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Structures every raw record.
    ///
    /// Records with a malformed identifier are logged, counted and skipped,
    /// as is every record repeating an identifier seen earlier in `raws`.
    /// The output is sorted by identifier.
    pub fn structure(&self, raws: &[RawRecord]) -> ParseOutcome {
        let mut stats = ParseStats::default();
        let mut records = Vec::with_capacity(raws.len());
        let mut seen = HashSet::new();

        for raw in raws {
            let record = match self.parser.parse(raw) {
                Ok(r) => r,
                Err(e) => {
                    warn!(id = %raw.id, error = %e, "skipping record");
                    stats.skipped_malformed += 1;
                    continue;
                }
            };

            if !seen.insert(record.id.clone()) {
                warn!(id = %record.id, "skipping duplicate record");
                stats.skipped_duplicate += 1;
                continue;
            }

            stats.total += 1;
            if record.actions.is_empty() {
                stats.missing_action += 1;
            }
            for action in &record.actions {
                *stats.actions.entry(action.clone()).or_insert(0) += 1;
            }
            records.push(record);
        }

        records.sort_by(|a, b| a.id.cmp(&b.id));

        info!(
            total = stats.total,
            missing_action = stats.missing_action,
            skipped = stats.skipped_malformed,
            duplicates = stats.skipped_duplicate,
            "structured records"
        );

        ParseOutcome { records, stats }
    }

    /// Resolves references across the complete set of structured records.
    pub fn resolve(&self, records: &mut [StructuredRecord]) -> ResolutionStats {
        let context = ResolutionContext::build(records);
        ReferenceResolver::new(&context).resolve_all(records)
    }
}

// ---------------------------------------------------------------------------
// Directory stages
// ---------------------------------------------------------------------------

impl Pipeline {
    /// Reads raw records from `input`, writes one structured record file per
    /// record plus `stats_parse.json` into `output`.
    pub fn parse_dir(&self, input: &Path, output: &Path) -> Result<ParseSummary> {
        let start = Instant::now();

        let raws: Vec<RawRecord> = corpus::read_records(input, &self.config)?;
        let outcome = self.structure(&raws);

        corpus::write_record_files(output, &outcome.records)?;
        corpus::write_json(&output.join(corpus::PARSE_STATS_FILENAME), &outcome.stats)?;

        Ok(ParseSummary {
            stats: outcome.stats,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Reads structured records from `input`, resolves them and writes the
    /// aggregate outputs into `output`.
    pub fn resolve_dir(&self, input: &Path, output: &Path) -> Result<ResolveSummary> {
        let start = Instant::now();

        let mut records: Vec<StructuredRecord> = corpus::read_records(input, &self.config)?;
        drop_duplicate_ids(&mut records);
        records.sort_by(|a, b| a.id.cmp(&b.id));
        let stats = self.resolve(&mut records);

        corpus::write_resolution_outputs(output, &records, &stats)?;

        Ok(ResolveSummary {
            stats,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Structures and resolves in one pass, writing the per-record files and
    /// the aggregate outputs into `output`.
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let start = Instant::now();

        let raws: Vec<RawRecord> = corpus::read_records(input, &self.config)?;
        let ParseOutcome {
            mut records,
            stats: parse,
        } = self.structure(&raws);
        let resolution = self.resolve(&mut records);

        corpus::write_record_files(output, &records)?;
        corpus::write_json(&output.join(corpus::PARSE_STATS_FILENAME), &parse)?;
        corpus::write_resolution_outputs(output, &records, &resolution)?;

        Ok(RunSummary {
            parse,
            resolution,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Keeps the first record for each identifier, in input order.
fn drop_duplicate_ids(records: &mut Vec<StructuredRecord>) {
    let mut seen = HashSet::new();
    records.retain(|record| {
        let first = seen.insert(record.id.clone());
        if !first {
            warn!(id = %record.id, "skipping duplicate record");
        }
        first
    });
}
