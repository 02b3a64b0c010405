//! Suricata rule book tooling
//!
//! Builds the document served as the `suricata_rules` category from a
//! directory of Suricata rule book files, and summarizes the rules it
//! contains. Output files are published atomically so a running API
//! never serves a half-written snapshot.

pub mod parse;
pub mod patterns;

pub use parse::{parse_classification_config, parse_rule, parse_rules, parse_sid_map, SuricataRule};
pub use patterns::{analyze_rules, PatternSummary};

use crate::storage::publish_atomic;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

const CLASSIFICATION_FILE: &str = "classification.config";

#[derive(Debug, Error)]
pub enum RulebookError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to list rule book directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything extracted from a rule book directory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    pub rules: Vec<SuricataRule>,
    /// SID to description, from `.map` files
    pub map: BTreeMap<String, String>,
    /// File name to trimmed contents, from `.txt` files
    pub text: BTreeMap<String, String>,
    pub classification: BTreeMap<String, String>,
}

impl RuleBook {
    pub fn load(path: &Path) -> Result<Self, RulebookError> {
        read_json(path)
    }

    pub fn publish(&self, path: &Path) -> Result<(), RulebookError> {
        write_json_atomic(path, self)
    }

    pub fn summarize(&self) -> PatternSummary {
        analyze_rules(&self.rules)
    }
}

/// Parse every recognized file directly inside `dir`, in file name order
pub fn build_rule_book(dir: &Path) -> Result<RuleBook, RulebookError> {
    let mut book = RuleBook::default();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let name = entry.file_name().to_string_lossy();

        if name.ends_with(".rules") {
            let rules = parse_rules(&read_text(path)?);
            debug!("{}: {} rules", name, rules.len());
            book.rules.extend(rules);
        } else if name.ends_with(".map") {
            book.map.extend(parse_sid_map(&read_text(path)?));
        } else if name.ends_with(".txt") {
            book.text
                .insert(name.to_string(), read_text(path)?.trim().to_string());
        } else if name == CLASSIFICATION_FILE {
            book.classification
                .extend(parse_classification_config(&read_text(path)?));
        }
    }

    info!(
        "Rule book {}: {} rules, {} sid mappings, {} text files, {} classifications",
        dir.display(),
        book.rules.len(),
        book.map.len(),
        book.text.len(),
        book.classification.len()
    );

    Ok(book)
}

fn read_text(path: &Path) -> Result<String, RulebookError> {
    std::fs::read_to_string(path).map_err(|source| RulebookError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RulebookError> {
    let content = read_text(path)?;
    serde_json::from_str(&content).map_err(|source| RulebookError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-print `value` and atomically replace `path` with it
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), RulebookError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| RulebookError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    publish_atomic(path, &json).map_err(|source| RulebookError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Wrote {}", path.display());
    Ok(())
}
