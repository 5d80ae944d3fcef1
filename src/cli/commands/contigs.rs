use crate::cli::output::*;
use crate::cli::CliContext;
use clap::Args;
use comfy_table::Cell;

#[derive(Args)]
pub struct ContigsArgs {
    /// Assembly reference, e.g. 7989/489/2
    #[arg(value_name = "REF")]
    pub reference: String,

    /// Contig ids to show in detail; all ids are listed when omitted
    #[arg(value_name = "CONTIG_ID")]
    pub contig_ids: Vec<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

pub fn run(args: ContigsArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let api = ctx.api()?;

    if args.contig_ids.is_empty() {
        let ids = api.get_contig_ids(&args.reference)?;
        if args.format == "json" {
            return super::print_json(&ids);
        }
        for id in &ids {
            println!("{}", id);
        }
        if ctx.verbose > 0 {
            info(&format!("{} contigs", format_number(ids.len() as u64)));
        }
        return Ok(());
    }

    let contigs = api.get_contigs(&args.reference, &args.contig_ids)?;
    if args.format == "json" {
        return super::print_json(&contigs);
    }
    if contigs.is_empty() {
        empty("None of the requested contigs were found");
        return Ok(());
    }

    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Contig"),
        header_cell("Length"),
        header_cell("GC"),
        header_cell("Circular"),
        header_cell("N count"),
        header_cell("Description"),
    ]);
    for (id, data) in &contigs {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(or_dash(data.length.map(format_number))),
            Cell::new(or_dash(data.gc_content.map(|gc| format!("{:.4}", gc)))),
            Cell::new(or_dash(data.is_circ)),
            Cell::new(or_dash(data.n_count)),
            Cell::new(data.description.as_deref().unwrap_or("")),
        ]);
    }
    println!("{}", table);
    Ok(())
}
