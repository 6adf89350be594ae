//! Per-tool manifest of written versions.
//!
//! `<root>/<tool>/manifest.json` records every version written for a tool,
//! when it was generated, and the SHA-256 checksum of each artifact file, so
//! a version directory can be checked for manual edits or truncation.
//!
//! # Examples
//!
//! ```no_run
//! use command_tree_store::{Manifest, OutputFormat, VersionEntry};
//!
//! let mut manifest = Manifest::new("az");
//! let mut entry = VersionEntry::new("2026-01-15T10:30:00Z", OutputFormat::Json);
//! entry.files.insert("az.json".into(), "ab12...".into());
//! manifest.record("2.61.0", entry);
//!
//! manifest.save("completions/az/manifest.json").unwrap();
//! let loaded = Manifest::load("completions/az/manifest.json").unwrap();
//! assert!(loaded.contains("2.61.0"));
//! ```

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::OutputFormat;
use crate::error::{Result, StoreError};

/// File name of the manifest inside a tool directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One written version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    /// ISO-8601 timestamp of the crawl that produced the version.
    pub generated_at: String,
    pub format: OutputFormat,
    /// SHA-256 hex digest per file name, relative to the version directory.
    pub files: BTreeMap<String, String>,
}

impl VersionEntry {
    pub fn new(generated_at: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            generated_at: generated_at.into(),
            format,
            files: BTreeMap::new(),
        }
    }
}

/// Versions written for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Tree contract version (mirrors [`command_tree_core::TREE_CONTRACT_VERSION`]).
    pub contract_version: String,
    pub tool: String,
    /// ISO-8601 timestamp of the last manifest update.
    pub updated_at: String,
    pub versions: BTreeMap<String, VersionEntry>,
}

impl Manifest {
    /// Creates an empty manifest stamped with the current time.
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            contract_version: command_tree_core::TREE_CONTRACT_VERSION.to_string(),
            tool: tool.into(),
            updated_at: Utc::now().to_rfc3339(),
            versions: BTreeMap::new(),
        }
    }

    /// Loads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::StoreError::Io) if the file cannot be read, or
    /// [`Json`](crate::StoreError::Json) if the content is not manifest JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_json::from_reader(reader)?;
        Ok(manifest)
    }

    /// Loads the manifest at `path`, or starts a new one for `tool` when the
    /// file does not exist yet.
    pub fn load_or_new(path: impl AsRef<Path>, tool: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new(tool));
        }
        let manifest = Self::load(path)?;
        if manifest.tool != tool {
            return Err(StoreError::InvalidManifest(format!(
                "{} belongs to tool {:?}, expected {:?}",
                path.display(),
                manifest.tool,
                tool
            )));
        }
        Ok(manifest)
    }

    /// Saves the manifest as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Inserts or replaces `version` and refreshes `updated_at`.
    pub fn record(&mut self, version: impl Into<String>, entry: VersionEntry) {
        self.versions.insert(version.into(), entry);
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn get(&self, version: &str) -> Option<&VersionEntry> {
        self.versions.get(version)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    /// Computes the SHA-256 hex digest of a file.
    pub fn calculate_checksum(path: impl AsRef<Path>) -> Result<String> {
        let bytes = std::fs::read(path)?;
        let hash = Sha256::digest(&bytes);
        Ok(format!("{:x}", hash))
    }

    /// Returns the files of `version` whose on-disk checksum no longer
    /// matches the recorded one (missing files included).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidManifest`](crate::StoreError::InvalidManifest) when
    /// `version` is not recorded.
    pub fn verify(&self, version: &str, version_dir: impl AsRef<Path>) -> Result<Vec<String>> {
        let entry = self.get(version).ok_or_else(|| {
            StoreError::InvalidManifest(format!("version {version} is not recorded"))
        })?;

        let dir = version_dir.as_ref();
        let mut mismatched = Vec::new();
        for (file, expected) in &entry.files {
            let path = dir.join(file);
            let matches = path.is_file() && Self::calculate_checksum(&path)? == *expected;
            if !matches {
                mismatched.push(file.clone());
            }
        }
        Ok(mismatched)
    }
}
