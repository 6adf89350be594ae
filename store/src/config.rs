//! Run configuration.
//!
//! A YAML file holding the crawl settings plus where and how artifacts are
//! written. Every field has a default, so an empty file is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! output_root: completions
//! format: json
//! crawl:
//!   tool: az
//!   fetch_concurrency: 2
//!   subtree_concurrency: 1
//!   duplicate_policy: keep-first
//!   http:
//!     retries: 2
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use command_tree_discovery::CrawlConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Serialization format of written artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }

    /// Guesses the format from a file extension (`yml` counts as YAML).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Settings for one `crawl` run.
///
/// # Examples
///
/// ```
/// use command_tree_store::{OutputFormat, RunConfig};
///
/// let config: RunConfig = serde_yaml::from_str("format: yaml\ncrawl:\n  tool: az\n").unwrap();
/// assert_eq!(config.format, OutputFormat::Yaml);
/// assert_eq!(config.crawl.fetch_concurrency, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory artifacts are written under; must already exist.
    pub output_root: PathBuf,
    pub format: OutputFormat,
    pub crawl: CrawlConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("completions"),
            format: OutputFormat::default(),
            crawl: CrawlConfig::default(),
        }
    }
}

impl RunConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::StoreError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::StoreError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: RunConfig = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Checks values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let crawl = &self.crawl;
        if crawl.tool.trim().is_empty() || crawl.tool.contains(char::is_whitespace) {
            return Err(StoreError::InvalidConfig(format!(
                "tool name {:?} must be a single non-empty token",
                crawl.tool
            )));
        }
        if crawl.fetch_concurrency == 0 || crawl.subtree_concurrency == 0 {
            return Err(StoreError::InvalidConfig(
                "concurrency bounds must be at least 1".to_string(),
            ));
        }
        for (field, value) in [("root_url", &crawl.root_url), ("release_url", &crawl.release_url)] {
            if value.trim().is_empty() {
                return Err(StoreError::InvalidConfig(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}
