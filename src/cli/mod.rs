pub mod commands;
pub mod output;

use crate::core::config::{load_config, Config};
use crate::core::paths;
use crate::AssemblyApi;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "asmcache",
    version,
    about = "Cached contig search and sequence extraction for genome assemblies",
    long_about = "asmcache keeps a checksum-keyed contig index and a bounded per-contig \
                  sequence cache so that paging through contigs and pulling subsequences \
                  from an assembly does not re-fetch it from the object store on every request."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to $ASMCACHE_HOME/config.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Auth token passed through to the object store and blob store
    #[arg(long, global = true, env = "ASMCACHE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the contigs of an assembly
    Search(commands::search::SearchArgs),

    /// Extract subsequences from an assembly
    Extract(commands::extract::ExtractArgs),

    /// Show assembly-level statistics and provenance
    Stats(commands::stats::StatsArgs),

    /// List contig ids or show per-contig details
    Contigs(commands::contigs::ContigsArgs),

    /// Inspect or clear the sequence cache
    Cache(commands::cache::CacheArgs),

    /// Show resolved data directories
    Paths,
}

/// Settings shared by every command
pub struct CliContext {
    pub config: Config,
    pub token: Option<String>,
    pub verbose: u8,
}

impl CliContext {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config(path)?,
            None => {
                let default_path = paths::default_config_path();
                if default_path.is_file() {
                    load_config(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        Ok(Self {
            config,
            token: cli.token.clone(),
            verbose: cli.verbose,
        })
    }

    pub fn api(&self) -> anyhow::Result<AssemblyApi> {
        Ok(AssemblyApi::connect(&self.config, self.token.clone())?)
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::from_cli(&cli)?;
    match cli.command {
        Commands::Search(args) => commands::search::run(args, &ctx),
        Commands::Extract(args) => commands::extract::run(args, &ctx),
        Commands::Stats(args) => commands::stats::run(args, &ctx),
        Commands::Contigs(args) => commands::contigs::run(args, &ctx),
        Commands::Cache(args) => commands::cache::run(args, &ctx),
        Commands::Paths => commands::paths::run(&ctx),
    }
}
