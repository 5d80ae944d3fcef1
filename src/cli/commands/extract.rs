use crate::bio::sequence::Location;
use crate::cli::CliContext;
use clap::Args;
use std::io::{self, BufWriter, Write};

#[derive(Args)]
pub struct ExtractArgs {
    /// Assembly or contig set reference, e.g. 7989/489/2
    #[arg(value_name = "REF")]
    pub reference: String,

    /// Features as contig:start:strand:length; join parts of one feature with ','
    #[arg(required = true, value_name = "FEATURE")]
    pub features: Vec<String>,

    /// Output format (fasta, plain, json)
    #[arg(long, default_value = "fasta")]
    pub format: String,

    /// FASTA line width (0 = unwrapped)
    #[arg(long, default_value = "60")]
    pub width: usize,
}

/// Parts of one feature, e.g. `ctg_1:10:+:5,ctg_1:40:+:8`
pub fn parse_feature(arg: &str) -> anyhow::Result<Vec<Location>> {
    Ok(arg
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim().parse::<Location>())
        .collect::<crate::Result<Vec<_>>>()?)
}

pub fn run(args: ExtractArgs, ctx: &CliContext) -> anyhow::Result<()> {
    let features = args
        .features
        .iter()
        .map(|f| parse_feature(f))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let sequences = ctx.api()?.extract_features(&args.reference, &features)?;

    if args.format == "json" {
        return super::print_json(&sequences);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (name, sequence) in args.features.iter().zip(&sequences) {
        if args.format == "plain" {
            writeln!(out, "{}", sequence)?;
            continue;
        }
        writeln!(out, ">{}", name)?;
        write_wrapped(&mut out, sequence, args.width)?;
    }
    out.flush()?;
    Ok(())
}

fn write_wrapped<W: Write>(out: &mut W, sequence: &str, width: usize) -> io::Result<()> {
    if width == 0 || sequence.is_empty() {
        return writeln!(out, "{}", sequence);
    }
    for chunk in sequence.as_bytes().chunks(width) {
        out.write_all(chunk)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}
