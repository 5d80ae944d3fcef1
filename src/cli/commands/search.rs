use crate::cli::output::*;
use crate::cli::CliContext;
use crate::index::{SearchParams, SearchResult};
use clap::Args;
use comfy_table::Cell;

#[derive(Args)]
pub struct SearchArgs {
    /// Assembly or contig set reference, e.g. 7989/489/2
    #[arg(value_name = "REF")]
    pub reference: String,

    /// Words that must all appear in a matching contig row
    #[arg(short, long)]
    pub query: Option<String>,

    /// Sort column, optionally suffixed with :asc or :desc (repeatable)
    #[arg(short, long, value_name = "COLUMN[:asc|:desc]")]
    pub sort: Vec<String>,

    /// Index of the first match to return
    #[arg(long)]
    pub start: Option<u64>,

    /// Maximum number of matches to return
    #[arg(short, long)]
    pub limit: Option<u64>,

    /// Total match count from an earlier page of the same query
    #[arg(long)]
    pub num_found: Option<u64>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// `length`, `length:asc` or `length:desc`
pub fn parse_sort_arg(arg: &str) -> anyhow::Result<(String, bool)> {
    match arg.rsplit_once(':') {
        Some((column, "asc")) => Ok((column.to_string(), true)),
        Some((column, "desc")) => Ok((column.to_string(), false)),
        Some((_, other)) => anyhow::bail!("Unknown sort direction '{}', use asc or desc", other),
        None => Ok((arg.to_string(), true)),
    }
}

pub fn run(args: SearchArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let params = SearchParams {
        reference: args.reference,
        query: args.query,
        sort_by: args
            .sort
            .iter()
            .map(|s| parse_sort_arg(s))
            .collect::<anyhow::Result<_>>()?,
        start: args.start,
        limit: args.limit,
        num_found: args.num_found,
    };

    let result = ctx.api()?.search_contigs(&params)?;
    match args.format.as_str() {
        "json" => super::print_json(&result),
        _ => {
            print_result(&params.reference, &result);
            Ok(())
        }
    }
}

fn print_result(reference: &str, result: &SearchResult) {
    section_header(&format!("Contigs of {}", reference));
    if result.contigs.is_empty() {
        empty(&format!(
            "No contigs on this page ({} found for query '{}')",
            format_number(result.num_found),
            result.query
        ));
        return;
    }

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Contig"),
        header_cell("Description"),
        header_cell("Length"),
        header_cell("GC"),
        header_cell("Circular"),
        header_cell("N count"),
        header_cell("MD5"),
    ]);
    for contig in &result.contigs {
        table.add_row(vec![
            Cell::new(&contig.contig_id),
            Cell::new(&contig.description),
            Cell::new(or_dash(contig.length.map(format_number))),
            Cell::new(or_dash(contig.gc_content.map(|gc| format!("{:.4}", gc)))),
            Cell::new(or_dash(contig.is_circular.map(|c| if c { "yes" } else { "no" }))),
            Cell::new(or_dash(contig.n_count)),
            Cell::new(&contig.md5),
        ]);
    }
    println!("{}", table);

    let first = result.start + 1;
    let last = result.start + result.contigs.len() as u64;
    info(&format!(
        "Showing {}-{} of {} matching contigs",
        format_number(first),
        format_number(last),
        format_number(result.num_found)
    ));
}
