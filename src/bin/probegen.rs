// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! probegen CLI
//!
//! Resolve probe statements against a reference genome and UCSC
//! annotation tables, printing one FASTA record per probe.

use clap::Parser;
use probegen::genome::open_text;
use probegen::{run, Annotation, Genome};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "probegen")]
#[command(author, version, about = "Generate probe sequences from probe statements")]
#[command(
    long_about = "Resolve probe statements against a reference genome and UCSC annotation \
tables, printing one FASTA record per probe to stdout.

Statements are one per line; warnings about unresolvable candidates go to stderr.

Examples:
  probegen statements.txt --genome genome.fa --annotation refseq_genes.txt
  echo '1:100c>g/50' | probegen - --genome genome.fa.gz"
)]
struct Cli {
    /// Probe statement file, one statement per line (use - for stdin)
    statements: PathBuf,

    /// Reference genome in multi-FASTA format (.gz supported)
    #[arg(short, long)]
    genome: PathBuf,

    /// UCSC annotation table; repeat for multiple tables (.gz supported)
    #[arg(short, long = "annotation")]
    annotation: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run_cli(&cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run_cli(cli: &Cli) -> probegen::Result<()> {
    let genome = Genome::load(&cli.genome)?;
    let annotation = Annotation::load(&cli.annotation)?;

    let statements: Box<dyn BufRead> = if cli.statements == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        open_text(&cli.statements)?
    };

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut errors = stderr.lock();

    run::run(statements, &genome, &annotation, &mut output, &mut errors)?;
    output.flush()?;
    Ok(())
}
