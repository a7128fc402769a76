use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;

use crate::driver::{ApiIndex, load_directory};
use crate::utils::logger;

#[derive(Parser, Debug)]
#[command(
    name = "doxystub",
    version,
    about = "Doxygen XML symbol resolver for Python binding stubs"
)]
pub struct DoxystubCli {
    #[command(subcommand)]
    command: Command,
}

impl DoxystubCli {
    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolves the documentation tree and prints the full symbol table as JSON.
    Dump { root: PathBuf },
    /// Prints the metadata and members of one compound as JSON.
    Query { root: PathBuf, name: String },
    /// Reports malformed files and type spellings that only sanitized.
    Check { root: PathBuf },
}

pub fn run() -> Result<()> {
    logger::init_logging();
    let cli = DoxystubCli::parse();
    match cli.command {
        Command::Dump { root } => handle_dump(&root),
        Command::Query { root, name } => handle_query(&root, &name),
        Command::Check { root } => handle_check(&root),
    }
}

fn load(root: &Path) -> Result<ApiIndex> {
    load_directory(root)
        .with_context(|| format!("failed to load documentation tree at {}", root.display()))
}

fn handle_dump(root: &Path) -> Result<()> {
    let index = load(root)?;
    let mut compounds = serde_json::Map::new();
    for name in index.compound_names() {
        compounds.insert(
            name.to_string(),
            json!({
                "metadata": index.metadata(name),
                "members": index.members(name),
            }),
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(compounds))?
    );
    Ok(())
}

fn handle_query(root: &Path, name: &str) -> Result<()> {
    let index = load(root)?;
    let Some(metadata) = index.metadata(name) else {
        bail!("unknown compound `{name}`");
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "metadata": metadata,
            "members": index.members(name),
        }))?
    );
    Ok(())
}

fn handle_check(root: &Path) -> Result<()> {
    let index = load(root)?;

    let clean_parse = index.parse_failures().is_empty();
    let clean_types = index.fallback_spellings().next().is_none();
    if clean_parse && clean_types {
        println!(
            "{} all files parsed, all type spellings resolved",
            "ok".green().bold()
        );
        return Ok(());
    }

    for (path, error) in index.parse_failures() {
        println!("{} {}: {}", "parse".red().bold(), path.display(), error);
    }
    for spelling in index.fallback_spellings() {
        println!(
            "{} `{spelling}` only sanitized; review the generated stub",
            "type".yellow().bold()
        );
    }
    Ok(())
}
