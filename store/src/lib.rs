//! Where crawled command trees live on disk.
//!
//! This crate owns everything between a finished
//! [`CompletionBundle`](command_tree_core::CompletionBundle) and the file
//! system: the output layout, the per-tool manifest with checksums, and the
//! YAML run configuration.
//!
//! # Quick start
//!
//! ```no_run
//! use command_tree_core::{CommandNode, CompletionBundle};
//! use command_tree_store::{ArtifactStore, OutputFormat};
//!
//! let store = ArtifactStore::open("completions", "az", OutputFormat::Json).unwrap();
//! if !store.has_version("2.61.0") {
//!     let bundle = CompletionBundle::new("2.61.0", "2026-01-15T10:30:00Z", CommandNode::new("az"));
//!     store.write_bundle(&bundle).unwrap();
//! }
//! ```

mod artifacts;
mod config;
mod error;
mod manifest;

pub use artifacts::{ArtifactStore, WrittenVersion};
pub use config::{OutputFormat, RunConfig};
pub use error::{Result, StoreError};
pub use manifest::{MANIFEST_FILE, Manifest, VersionEntry};
