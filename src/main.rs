//! champ-archive CLI - save, load and inspect archives of string sets
//!
//! Every saved set is stored content-addressed: saving a new version of a set
//! only adds the nodes that differ from versions already in the archive.

use anyhow::Context;
use champ_archive::archive::{make_loader_for, save_to_archive, to_transferable_form};
use champ_archive::{store, ArchiveFormat, ContainerId, LoadArchive, SaveArchive, Set, VERSION};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "champ-archive")]
#[command(about = "Content-addressed archives of persistent string sets")]
#[command(version)]
struct Cli {
    /// Path to the archive file
    #[arg(short, long, default_value = "archive.champ")]
    archive: PathBuf,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Encoding used when writing the archive file
    #[arg(short, long, default_value = "binary")]
    encoding: Encoding,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Encoding {
    Binary,
    Json,
}

impl From<Encoding> for ArchiveFormat {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Binary => ArchiveFormat::Binary,
            Encoding::Json => ArchiveFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save a set of values, creating the archive if needed
    Save {
        /// Values to put in the set
        values: Vec<String>,
        /// Start from the set saved under this id instead of an empty set
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Print the values of a saved set
    Load {
        /// The container id
        id: String,
    },

    /// List saved sets and node statistics
    Inspect,

    /// Rebuild every saved set, failing on the first malformed one
    Verify,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Save { values, base } => {
            let existing = if cli.archive.exists() {
                Some(open_archive(&cli.archive)?)
            } else {
                None
            };

            let (archive, set) = match (existing, base) {
                (Some(existing), Some(base)) => {
                    let mut loader = make_loader_for(Set::new(), existing);
                    let set = loader.load(parse_id(&base)?)?;
                    (SaveArchive::from(loader.into_archive()), set)
                }
                (Some(existing), None) => (SaveArchive::from(existing), Set::new()),
                (None, Some(base)) => anyhow::bail!(
                    "No archive at {} to read base {} from",
                    cli.archive.display(),
                    base
                ),
                (None, None) => (SaveArchive::new(), Set::new()),
            };

            let mut transient = set.into_transient();
            transient.extend(values);
            let set = transient.persistent();

            let nodes_before = archive.node_count();
            let (archive, id) = save_to_archive(&set, archive)?;
            store::write_archive(
                &cli.archive,
                &to_transferable_form(&archive),
                cli.encoding.into(),
            )?;

            output(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "id": id.to_hex(),
                    "size": set.len(),
                    "nodes": archive.node_count(),
                    "new_nodes": archive.node_count() - nodes_before,
                }),
            )?;
        }

        Commands::Load { id } => {
            let id = parse_id(&id)?;
            let mut loader = make_loader_for(Set::<String>::new(), open_archive(&cli.archive)?);
            let set = loader.load(id)?;

            let mut values: Vec<&String> = set.iter().collect();
            values.sort();
            output(
                cli.format,
                &serde_json::json!({
                    "id": id.to_hex(),
                    "size": set.len(),
                    "values": values,
                }),
            )?;
        }

        Commands::Inspect => {
            let archive = open_archive(&cli.archive)?;
            let roots: Vec<_> = archive
                .root_ids()
                .into_iter()
                .filter_map(|id| archive.root(&id).map(|root| (id, *root)))
                .map(|(id, root)| {
                    serde_json::json!({
                        "id": id.to_hex(),
                        "kind": root.kind.to_string(),
                        "size": root.size,
                        "node": root.node.to_hex(),
                    })
                })
                .collect();

            output(
                cli.format,
                &serde_json::json!({
                    "version": VERSION,
                    "nodes": archive.node_count(),
                    "roots": roots,
                }),
            )?;
        }

        Commands::Verify => {
            let archive = open_archive(&cli.archive)?;
            let ids = archive.root_ids();
            let mut loader = make_loader_for(Set::<String>::new(), archive);

            for id in &ids {
                if let Err(e) = loader.load(*id) {
                    output(
                        cli.format,
                        &serde_json::json!({
                            "status": "error",
                            "id": id.to_hex(),
                            "error": e.to_string(),
                        }),
                    )?;
                    anyhow::bail!("Archive {} failed verification", cli.archive.display());
                }
            }

            output(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "roots": ids.len(),
                    "nodes": loader.cached_nodes(),
                }),
            )?;
        }
    }

    Ok(())
}

fn open_archive(path: &Path) -> anyhow::Result<LoadArchive<String>> {
    let archive = store::read_archive(path)
        .with_context(|| format!("Failed to read archive {}", path.display()))?;
    Ok(LoadArchive::try_from(archive)?)
}

fn parse_id(id: &str) -> anyhow::Result<ContainerId> {
    id.parse::<ContainerId>().map_err(|_| anyhow::anyhow!("Invalid container id: {}", id))
}

fn output(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
