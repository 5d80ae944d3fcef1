use asmcache::cli::Cli;
use asmcache::AssemblyError;
use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // ASMCACHE_LOG wins over -v; -v raises the default level
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let log_level = std::env::var("ASMCACHE_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = asmcache::cli::run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<AssemblyError>() {
            Some(AssemblyError::Configuration(_)) => 2,
            Some(AssemblyError::Io(_)) => 3,
            Some(AssemblyError::InvalidInput(_))
            | Some(AssemblyError::UnknownColumn { .. })
            | Some(AssemblyError::InvalidLocation(_))
            | Some(AssemblyError::InvalidType(_))
            | Some(AssemblyError::UnsupportedType(_))
            | Some(AssemblyError::NotFound(_)) => 4,
            Some(AssemblyError::UpstreamFetch(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}
