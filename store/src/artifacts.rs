//! Artifact layout under the output root.
//!
//! ```text
//! <root>/
//! └── <tool>/
//!     ├── manifest.json
//!     └── <version>/
//!         ├── <tool>.json      root object: base command stubs + global options
//!         ├── <base>.json      one full tree per base command
//!         └── ...
//! ```
//!
//! A version directory only appears once all of its files are written: files
//! go to a hidden staging directory that is renamed into place at the end.
//! An existing version directory therefore always means a complete write and
//! makes the next run for that version a no-op.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use command_tree_core::{CommandNode, CompletionBundle};
use tracing::{debug, info};

use crate::config::OutputFormat;
use crate::error::{Result, StoreError};
use crate::manifest::{MANIFEST_FILE, Manifest, VersionEntry};

/// Handle on `<root>/<tool>`.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    tool: String,
    format: OutputFormat,
}

/// Files produced by [`ArtifactStore::write_bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenVersion {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl ArtifactStore {
    /// Opens the store; `root` must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`MissingOutputRoot`](crate::StoreError::MissingOutputRoot)
    /// when `root` is not an existing directory.
    pub fn open(root: impl Into<PathBuf>, tool: impl Into<String>, format: OutputFormat) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::MissingOutputRoot(root));
        }
        Ok(Self {
            root,
            tool: tool.into(),
            format,
        })
    }

    pub fn tool_dir(&self) -> PathBuf {
        self.root.join(&self.tool)
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.tool_dir().join(version)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.tool_dir().join(MANIFEST_FILE)
    }

    /// Whether artifacts for `version` were already written.
    pub fn has_version(&self, version: &str) -> bool {
        self.version_dir(version).is_dir()
    }

    /// Path of the file a `<tool>/<version>/<base>` load reference points
    /// to, in this store's format.
    pub fn resolve_load_ref(&self, load_ref: &str) -> PathBuf {
        self.root
            .join(load_ref)
            .with_extension(self.format.extension())
    }

    /// Writes the root object and every base command tree of `bundle`, then
    /// records the version in the manifest.
    pub fn write_bundle(&self, bundle: &CompletionBundle) -> Result<WrittenVersion> {
        let final_dir = self.version_dir(&bundle.version);
        let staging = self.tool_dir().join(format!(".{}.partial", bundle.version));
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        let mut entry = VersionEntry::new(bundle.generated_at.as_str(), self.format);
        let mut names = Vec::with_capacity(bundle.commands.len() + 1);

        let root_file = self.file_name(&self.tool);
        self.write_node(&staging.join(&root_file), &bundle.root)?;
        entry.files.insert(root_file.clone(), Manifest::calculate_checksum(staging.join(&root_file))?);
        names.push(root_file);

        for command in &bundle.commands {
            let file = self.file_name(&command.name);
            self.write_node(&staging.join(&file), command)?;
            entry.files.insert(file.clone(), Manifest::calculate_checksum(staging.join(&file))?);
            debug!(base = %command.name, file = %file, "Wrote base command tree");
            names.push(file);
        }

        std::fs::rename(&staging, &final_dir)?;

        let mut manifest = Manifest::load_or_new(self.manifest_path(), &self.tool)?;
        manifest.record(bundle.version.as_str(), entry);
        manifest.save(self.manifest_path())?;

        info!(
            tool = %self.tool,
            version = %bundle.version,
            dir = %final_dir.display(),
            files = names.len(),
            "Wrote completion artifacts"
        );
        Ok(WrittenVersion {
            files: names.iter().map(|name| final_dir.join(name)).collect(),
            dir: final_dir,
        })
    }

    /// Reads a written version back into a bundle, base commands in root stub
    /// order.
    pub fn load_bundle(&self, version: &str) -> Result<CompletionBundle> {
        let dir = self.version_dir(version);
        let root = self.read_node(&dir.join(self.file_name(&self.tool)))?;

        let mut commands = Vec::with_capacity(root.subcommands.len());
        for stub in &root.subcommands {
            let path = match &stub.load_spec_ref {
                Some(load_ref) => self.resolve_load_ref(load_ref),
                None => dir.join(self.file_name(&stub.name)),
            };
            commands.push(self.read_node(&path)?);
        }

        let generated_at = Manifest::load_or_new(self.manifest_path(), &self.tool)?
            .get(version)
            .map(|entry| entry.generated_at.clone())
            .unwrap_or_default();

        let mut bundle = CompletionBundle::new(version, generated_at, root);
        bundle.commands = commands;
        Ok(bundle)
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }

    fn write_node(&self, path: &Path, node: &CommandNode) -> Result<()> {
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match self.format {
            OutputFormat::Json => serde_json::to_writer_pretty(writer, node)?,
            OutputFormat::Yaml => serde_yaml::to_writer(writer, node)?,
        }
        Ok(())
    }

    fn read_node(&self, path: &Path) -> Result<CommandNode> {
        let reader = BufReader::new(std::fs::File::open(path)?);
        let node = match self.format {
            OutputFormat::Json => serde_json::from_reader(reader)?,
            OutputFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        Ok(node)
    }
}
