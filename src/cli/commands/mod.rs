pub mod cache;
pub mod contigs;
pub mod extract;
pub mod paths;
pub mod search;
pub mod stats;

/// Print any serializable result as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
