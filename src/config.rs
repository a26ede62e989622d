use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, UsneseniError};

/// Name of the configuration file stored inside the `.usneseni` directory.
pub const CONFIG_FILENAME: &str = "config.json";

/// Name of the hidden directory holding pipeline settings.
pub const USNESENI_DIR: &str = ".usneseni";

/// Configuration for the structuring and resolution pipeline.
///
/// Controls which issuing bodies are recognized in record headers, how
/// eagerly trailing commentary is split off, and which input files are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Schema version of the configuration.
    pub version: u32,
    /// Issuing-body labels that may open a record's text.
    pub organ_headers: Vec<String>,
    /// Minimum number of words the last item must keep for a tail split.
    pub tail_min_head_words: usize,
    /// Glob patterns for input files, relative to the input directory.
    pub include: Vec<String>,
    /// Glob patterns for input files to skip.
    pub exclude: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: 1,
            organ_headers: vec![
                "Rada města Litovel".to_string(),
                "Zastupitelstvo města Litovel".to_string(),
            ],
            tail_min_head_words: 3,
            include: vec!["*.json".to_string()],
            exclude: vec![
                ".usneseni/**".to_string(),
                "stats_*.json".to_string(),
                "refs_index.json".to_string(),
                "usneseni.json".to_string(),
            ],
        }
    }
}

/// Returns the path to the `.usneseni` directory within the given root.
pub fn get_usneseni_dir(root: &Path) -> PathBuf {
    root.join(USNESENI_DIR)
}

/// Returns the path to `config.json` within the `.usneseni` directory.
pub fn get_config_path(root: &Path) -> PathBuf {
    get_usneseni_dir(root).join(CONFIG_FILENAME)
}

/// Loads the configuration from disk.
///
/// A missing configuration file yields the defaults.
pub fn load_config(root: &Path) -> Result<PipelineConfig> {
    let config_path = get_config_path(root);

    if !config_path.exists() {
        return Ok(PipelineConfig::default());
    }

    let contents = fs::read_to_string(&config_path).map_err(|e| UsneseniError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: PipelineConfig =
        serde_json::from_str(&contents).map_err(|e| UsneseniError::Config {
            message: format!(
                "failed to parse config file '{}': {}",
                config_path.display(),
                e
            ),
        })?;

    Ok(config)
}

/// Saves the configuration to disk using an atomic write.
///
/// Writes to a temporary file first and then renames it into place.
pub fn save_config(root: &Path, config: &PipelineConfig) -> Result<()> {
    let usneseni_dir = get_usneseni_dir(root);
    fs::create_dir_all(&usneseni_dir).map_err(|e| UsneseniError::Config {
        message: format!(
            "failed to create config directory '{}': {}",
            usneseni_dir.display(),
            e
        ),
    })?;

    let config_path = get_config_path(root);
    let tmp_path = config_path.with_extension("tmp");

    let json = serde_json::to_string_pretty(config).map_err(|e| UsneseniError::Config {
        message: format!("failed to serialize config: {}", e),
    })?;

    fs::write(&tmp_path, &json).map_err(|e| UsneseniError::Config {
        message: format!(
            "failed to write temporary config file '{}': {}",
            tmp_path.display(),
            e
        ),
    })?;

    fs::rename(&tmp_path, &config_path).map_err(|e| UsneseniError::Config {
        message: format!(
            "failed to rename temporary config file '{}' to '{}': {}",
            tmp_path.display(),
            config_path.display(),
            e
        ),
    })?;

    Ok(())
}

/// Determines whether an input file should be read, based on the
/// configuration's include and exclude glob patterns.
///
/// Exclude patterns take precedence over include patterns.
pub fn should_include_file(file_path: &str, config: &PipelineConfig) -> bool {
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    for pattern_str in &config.exclude {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return false;
            }
        }
    }

    for pattern_str in &config.include {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_path, match_opts) {
                return true;
            }
        }
    }

    false
}
