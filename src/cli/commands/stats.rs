use crate::cli::output::*;
use crate::cli::CliContext;
use clap::Args;
use serde::Serialize;

#[derive(Args)]
pub struct StatsArgs {
    /// Assembly reference, e.g. 7989/489/2
    #[arg(value_name = "REF")]
    pub reference: String,

    /// Also list genomes that reference this assembly
    #[arg(long)]
    pub annotations: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Serialize)]
struct StatsReport {
    assembly_id: String,
    num_contigs: Option<u64>,
    dna_size: Option<u64>,
    gc_content: Option<f64>,
    external_source: Option<String>,
    external_source_id: Option<String>,
    external_source_origination_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    genome_annotations: Option<Vec<String>>,
}

pub fn run(args: StatsArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let stats = api.get_stats(&args.reference)?;
    let source = api.get_external_source_info(&args.reference)?;
    let report = StatsReport {
        assembly_id: api.get_assembly_id(&args.reference)?,
        num_contigs: stats.num_contigs,
        dna_size: stats.dna_size,
        gc_content: stats.gc_content,
        external_source: source.external_source,
        external_source_id: source.external_source_id,
        external_source_origination_date: source.external_source_origination_date,
        genome_annotations: if args.annotations {
            Some(api.get_genome_annotations(&args.reference)?)
        } else {
            None
        },
    };

    if args.format == "json" {
        return super::print_json(&report);
    }

    tree_section(
        &format!("Assembly {} ({})", report.assembly_id, args.reference),
        vec![
            ("Contigs", or_dash(report.num_contigs.map(format_number))),
            ("DNA size", or_dash(report.dna_size.map(|s| format!("{} bp", format_number(s))))),
            ("GC content", or_dash(report.gc_content.map(|gc| format!("{:.2}%", gc * 100.0)))),
        ],
    );
    tree_section(
        "External source",
        vec![
            ("Source", or_dash(report.external_source.as_ref())),
            ("Source id", or_dash(report.external_source_id.as_ref())),
            ("Origination date", or_dash(report.external_source_origination_date.as_ref())),
        ],
    );

    if let Some(genomes) = &report.genome_annotations {
        section_header("Referencing genomes");
        if genomes.is_empty() {
            empty("No genomes reference this assembly");
        }
        for (i, genome) in genomes.iter().enumerate() {
            tree_item(i + 1 == genomes.len(), genome, None);
        }
    }
    Ok(())
}
