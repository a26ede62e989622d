use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::config::{should_include_file, PipelineConfig};
use crate::errors::{Result, UsneseniError};
use crate::types::{ResolutionStats, StructuredRecord};

/// All resolved records in identifier order.
pub const RECORDS_FILENAME: &str = "usneseni.json";
/// `"SOURCE -> raw"` to resolved target.
pub const REFS_INDEX_FILENAME: &str = "refs_index.json";
/// Resolution statistics.
pub const REFS_STATS_FILENAME: &str = "stats_refs.json";
/// Structuring statistics.
pub const PARSE_STATS_FILENAME: &str = "stats_parse.json";

/// Lists the input files under `dir` that the configuration selects, sorted
/// by relative path.
pub fn scan_files(dir: &Path, config: &PipelineConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(UsneseniError::File {
            message: "input is not a directory".to_string(),
            path: dir.display().to_string(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(dir) {
            let rel_str = relative.to_string_lossy().to_string();
            if should_include_file(&rel_str, config) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Reads one JSON document per selected file.
///
/// Files that cannot be read or decoded are logged and skipped.
pub fn read_records<T: DeserializeOwned>(dir: &Path, config: &PipelineConfig) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for path in scan_files(dir, config)? {
        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable record file");
                continue;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(record) => records.push(record),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping undecodable record file"),
        }
    }
    Ok(records)
}

/// Writes a value as pretty JSON, via a temporary file and a rename.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, json).map_err(|e| UsneseniError::File {
        message: format!("failed to write temporary file: {}", e),
        path: tmp_path.display().to_string(),
    })?;

    fs::rename(&tmp_path, path).map_err(|e| UsneseniError::File {
        message: format!("failed to move temporary file into place: {}", e),
        path: path.display().to_string(),
    })?;

    Ok(())
}

/// Writes each record to `<dir>/RM-1853-60-2025.json`.
pub fn write_record_files(dir: &Path, records: &[StructuredRecord]) -> Result<usize> {
    ensure_dir(dir)?;
    for record in records {
        let path = dir.join(format!("{}.json", record.id.file_stem()));
        write_json(&path, record)?;
    }
    Ok(records.len())
}

/// Maps `"SOURCE -> raw"` to the identifier the mention resolved to.
pub fn refs_index(stats: &ResolutionStats) -> BTreeMap<String, String> {
    stats
        .links
        .iter()
        .map(|link| {
            (
                format!("{} -> {}", link.source, link.raw),
                link.target.to_string(),
            )
        })
        .collect()
}

/// Writes the aggregate outputs of the resolution stage.
pub fn write_resolution_outputs(
    dir: &Path,
    records: &[StructuredRecord],
    stats: &ResolutionStats,
) -> Result<()> {
    ensure_dir(dir)?;
    write_json(&dir.join(RECORDS_FILENAME), records)?;
    write_json(&dir.join(REFS_INDEX_FILENAME), &refs_index(stats))?;
    write_json(&dir.join(REFS_STATS_FILENAME), stats)?;
    Ok(())
}

/// Creates the output directory if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| UsneseniError::File {
        message: format!("failed to create output directory: {}", e),
        path: dir.display().to_string(),
    })
}
