use crate::cli::output::*;
use crate::cli::CliContext;
use crate::storage::SequenceCache;
use clap::{Args, Subcommand};
use comfy_table::Cell;

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached assemblies, oldest first
    List,

    /// Remove every cached assembly
    Clear,
}

pub fn run(args: CacheArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let cache = SequenceCache::new(&ctx.config.sequence_cache)?;
    match args.command {
        CacheCommand::List => list(&cache, ctx),
        CacheCommand::Clear => {
            let removed = cache.clear()?;
            success(&format!("Removed {} cached assemblies", removed));
            Ok(())
        }
    }
}

fn list(cache: &SequenceCache, ctx: &CliContext) -> anyhow::Result<()> {
    let entries = cache.list_entries()?;
    section_header(&format!("Sequence cache at {}", cache.cache_dir().display()));
    if entries.is_empty() {
        empty("No cached assemblies");
        return Ok(());
    }

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Reference"),
        header_cell("Contigs"),
        header_cell("Size"),
    ]);
    let mut total = 0;
    for entry in &entries {
        total += entry.size_bytes;
        table.add_row(vec![
            Cell::new(entry.name.replace(':', "/")),
            Cell::new(format_number(entry.contigs as u64)),
            Cell::new(format_size(entry.size_bytes)),
        ]);
    }
    println!("{}", table);
    info(&format!(
        "{} of {} slots used, {} on disk",
        entries.len(),
        ctx.config.sequence_cache.max_cached_objects,
        format_size(total)
    ));
    Ok(())
}
