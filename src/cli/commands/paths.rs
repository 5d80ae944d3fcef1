use crate::cli::output::*;
use crate::cli::CliContext;
use crate::core::config::CacheBackend;
use crate::core::paths;

pub fn run(ctx: &CliContext) -> anyhow::Result<()> {
    println!("{}", paths::describe_paths());

    let cache = match &ctx.config.sequence_cache.backend {
        CacheBackend::LocalDisk { path } => path.display().to_string(),
        CacheBackend::KeyValue { url } => format!("{} (key-value, unsupported)", url),
    };
    tree_section(
        "Effective configuration",
        vec![
            ("Index directory", ctx.config.index.index_dir.display().to_string()),
            ("Sequence cache", cache),
            (
                "Cache capacity",
                format_number(ctx.config.sequence_cache.max_cached_objects as u64),
            ),
            ("Object store", ctx.config.remote.workspace_url.clone()),
            ("Blob store", ctx.config.remote.blob_url.clone()),
        ],
    );
    Ok(())
}
