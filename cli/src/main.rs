use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use command_tree_core::{CommandNode, CommandOption, DuplicatePolicy, validate_bundle};
use command_tree_discovery::page::Page;
use command_tree_discovery::page::detail::{DetailCommand, extract_commands, extract_group_page};
use command_tree_discovery::page::globals::extract_global_options;
use command_tree_discovery::page::listing::extract_listing;
use command_tree_discovery::{CrawlError, Crawler, HttpPageSource};
use command_tree_store::{ArtifactStore, Manifest, OutputFormat, RunConfig, StoreError};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "command-tree")]
#[command(about = "Rebuild a CLI tool's command tree from its documentation site")]
struct Cli {
    /// Log debug output from the crawler (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Crawl the documentation site and write the command tree.
    Crawl(CrawlArgs),
    /// Parse one saved documentation page and print what it yields.
    ParseFile(ParseFileArgs),
    /// Check a written version against the tree invariants and its manifest.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct CrawlArgs {
    /// Run configuration YAML; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Existing directory the artifacts are written under.
    #[arg(long)]
    output_root: Option<PathBuf>,
    /// Artifact format.
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Root command name.
    #[arg(long)]
    tool: Option<String>,
    /// Reference index URL listing the base commands.
    #[arg(long)]
    root_url: Option<String>,
    /// Release page whose title carries the current version.
    #[arg(long)]
    release_url: Option<String>,
    /// Use this version instead of reading the release page.
    #[arg(long)]
    tool_version: Option<String>,
    /// Maximum concurrent page fetches.
    #[arg(long)]
    fetch_concurrency: Option<usize>,
    /// Maximum base commands built at once.
    #[arg(long)]
    subtree_concurrency: Option<usize>,
    /// Which listing row wins when two base commands share a name.
    #[arg(long)]
    duplicate_policy: Option<DuplicatePolicy>,
    /// Retry failed fetches this many times with exponential backoff.
    #[arg(long)]
    retries: Option<u32>,
}

impl CrawlArgs {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(root) = &self.output_root {
            config.output_root = root.clone();
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        let crawl = &mut config.crawl;
        if let Some(tool) = &self.tool {
            crawl.tool = tool.clone();
        }
        if let Some(url) = &self.root_url {
            crawl.root_url = url.clone();
        }
        if let Some(url) = &self.release_url {
            crawl.release_url = url.clone();
        }
        if let Some(bound) = self.fetch_concurrency {
            crawl.fetch_concurrency = bound;
        }
        if let Some(bound) = self.subtree_concurrency {
            crawl.subtree_concurrency = bound;
        }
        if let Some(policy) = self.duplicate_policy {
            crawl.duplicate_policy = policy;
        }
        if let Some(retries) = self.retries {
            crawl.http.retries = retries;
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ParseMode {
    /// Base command rows of a reference index.
    Listing,
    /// Command headings and their parameters.
    Detail,
    /// Group path, summary and leaf commands of a group page.
    Group,
    /// Global parameters of a reference index.
    Globals,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Saved HTML page.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, value_enum)]
    mode: ParseMode,
    /// URL the page was fetched from, for resolving relative links
    /// (default: the input file itself).
    #[arg(long)]
    url: Option<String>,
    /// Root command name.
    #[arg(long, default_value = "az")]
    tool: String,
    /// Leading heading tokens dropped in detail mode (2 on group pages, 1 on
    /// the reference index).
    #[arg(long, default_value_t = 2)]
    prefix_tokens: usize,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Directory the artifacts were written under.
    #[arg(long)]
    output_root: PathBuf,
    /// Root command name.
    #[arg(long, default_value = "az")]
    tool: String,
    /// Version directory to check.
    #[arg(long)]
    tool_version: String,
    /// Artifact format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

/// Why a subcommand failed, and with which exit code.
#[derive(Debug)]
enum Failure {
    /// Usage precondition not met (exit code 2).
    Precondition(String),
    /// Crawl, I/O or data failure (exit code 1).
    Run(String),
}

impl Failure {
    fn exit_code(&self) -> ExitCode {
        match self {
            Failure::Precondition(_) => ExitCode::from(2),
            Failure::Run(_) => ExitCode::from(1),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Precondition(msg) | Failure::Run(msg) => f.write_str(msg),
        }
    }
}

impl From<CrawlError> for Failure {
    fn from(err: CrawlError) -> Self {
        Failure::Run(err.to_string())
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        if err.is_precondition() {
            Failure::Precondition(err.to_string())
        } else {
            Failure::Run(err.to_string())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Crawl(args) => run_crawl(args).await,
        Command::ParseFile(args) => run_parse_file(args),
        Command::Validate(args) => run_validate(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,command_tree_discovery=debug,command_tree_store=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_crawl(args: CrawlArgs) -> Result<(), Failure> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let tool = config.crawl.tool.clone();
    let store = ArtifactStore::open(&config.output_root, &tool, config.format)?;
    let crawler = Crawler::new(HttpPageSource::new(&config.crawl.http)?, config.crawl);

    let version = match args.tool_version {
        Some(version) => version,
        None => crawler.resolve_version().await?,
    };
    if store.has_version(&version) {
        info!(tool = %tool, version = %version, "Artifacts already present, nothing to do");
        println!("{tool} {version} is already up to date.");
        return Ok(());
    }

    let bundle = crawler.crawl(&version).await?;
    for problem in validate_bundle(&bundle) {
        warn!(%problem, "Crawled tree violates an invariant");
    }

    let written = store.write_bundle(&bundle)?;
    println!(
        "Wrote {} file(s) for {tool} {version} to '{}'.",
        written.files.len(),
        written.dir.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct ListingRow {
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

#[derive(Serialize)]
struct GroupOutput {
    path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    leaves: Vec<CommandNode>,
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), Failure> {
    let html = fs::read_to_string(&args.input)
        .map_err(|err| Failure::Run(format!("Failed to read '{}': {err}", args.input.display())))?;
    let url = page_url(&args)?;
    let page = Page::parse(&url, &html);

    let raw = match args.mode {
        ParseMode::Listing => {
            let rows: Vec<ListingRow> = extract_listing(&page)
                .into_iter()
                .map(|entry| ListingRow {
                    name: entry.name,
                    description: entry.description,
                    link: entry.link.map(String::from),
                })
                .collect();
            render(&rows, args.format)?
        }
        ParseMode::Detail => {
            let nodes: Vec<CommandNode> = extract_commands(&page, &args.tool, args.prefix_tokens)
                .into_iter()
                .map(DetailCommand::into_node)
                .collect();
            render(&nodes, args.format)?
        }
        ParseMode::Group => {
            let group = extract_group_page(&page, &args.tool);
            render(
                &GroupOutput {
                    path: group.path,
                    summary: group.summary,
                    leaves: group.leaves,
                },
                args.format,
            )?
        }
        ParseMode::Globals => {
            let options: Vec<CommandOption> = extract_global_options(&page);
            render(&options, args.format)?
        }
    };

    println!("{raw}");
    Ok(())
}

fn page_url(args: &ParseFileArgs) -> Result<Url, Failure> {
    if let Some(raw) = &args.url {
        return Url::parse(raw).map_err(|err| Failure::Run(format!("Invalid --url '{raw}': {err}")));
    }
    let absolute = fs::canonicalize(&args.input)
        .map_err(|err| Failure::Run(format!("Failed to resolve '{}': {err}", args.input.display())))?;
    Url::from_file_path(&absolute)
        .map_err(|()| Failure::Run(format!("Cannot express '{}' as a URL", absolute.display())))
}

fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String, Failure> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| Failure::Run(format!("JSON serialization failed: {e}"))),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| Failure::Run(format!("YAML serialization failed: {e}")))
        }
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), Failure> {
    let store = ArtifactStore::open(&args.output_root, &args.tool, args.format)?;
    if !store.has_version(&args.tool_version) {
        return Err(Failure::Run(format!(
            "No artifacts for {} {} under '{}'",
            args.tool,
            args.tool_version,
            args.output_root.display()
        )));
    }

    let bundle = store.load_bundle(&args.tool_version)?;
    let mut problems: Vec<String> = validate_bundle(&bundle).iter().map(ToString::to_string).collect();

    let manifest = Manifest::load_or_new(store.manifest_path(), &args.tool)?;
    if manifest.contains(&args.tool_version) {
        for file in manifest.verify(&args.tool_version, store.version_dir(&args.tool_version))? {
            problems.push(format!("checksum mismatch: {file}"));
        }
    } else {
        problems.push(format!("version {} missing from manifest", args.tool_version));
    }

    if problems.is_empty() {
        println!(
            "Validated {} {}: root plus {} base command tree(s).",
            args.tool,
            args.tool_version,
            bundle.command_count()
        );
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("  {problem}");
        }
        Err(Failure::Run(format!("{} problem(s) found", problems.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_values() {
        let cli = Cli::parse_from([
            "command-tree",
            "crawl",
            "--output-root",
            "/tmp/out",
            "--format",
            "yaml",
            "--fetch-concurrency",
            "4",
            "--duplicate-policy",
            "keep-last",
            "--retries",
            "2",
        ]);
        let Command::Crawl(args) = cli.command else {
            panic!("expected crawl");
        };

        let mut config = RunConfig::default();
        args.apply(&mut config);
        assert_eq!(config.output_root, PathBuf::from("/tmp/out"));
        assert_eq!(config.format, OutputFormat::Yaml);
        assert_eq!(config.crawl.fetch_concurrency, 4);
        assert_eq!(config.crawl.subtree_concurrency, 1);
        assert_eq!(config.crawl.duplicate_policy, DuplicatePolicy::KeepLast);
        assert_eq!(config.crawl.http.retries, 2);
        assert_eq!(config.crawl.tool, "az");
    }

    #[test]
    fn test_missing_output_root_is_a_precondition_failure() {
        let failure = Failure::from(StoreError::MissingOutputRoot(PathBuf::from("/nope")));
        assert!(matches!(failure, Failure::Precondition(_)));
        assert_eq!(failure.exit_code(), ExitCode::from(2));
    }

    #[test]
    fn test_crawl_errors_exit_with_one() {
        let failure = Failure::from(CrawlError::FetchStatus {
            url: "https://docs.example.com".into(),
            status: 500,
        });
        assert_eq!(failure.exit_code(), ExitCode::from(1));
        assert!(failure.to_string().contains("500"));
    }
}
