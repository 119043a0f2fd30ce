//! CLI entry point for gtfunify.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, Level};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gtfunify::config::{Config, MatchMode};
use gtfunify::output::GtfWriter;
use gtfunify::parser::GtfReader;
use gtfunify::pipeline::Unifier;

/// Default decision-log file when the GTF goes to stdout.
const DEFAULT_STATS_FILE: &str = "unify_stats.csv";

/// Consolidate multi-source gene models into one gene set per locus.
///
/// Reads a locus-sorted GTF (e.g. from `gffread --cluster-only`) and writes a
/// consolidated GTF plus a per-transcript CSV decision log.
#[derive(Parser, Debug)]
#[command(name = "gtfunify")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Locus-sorted GTF file (plain or gzip)
    input: PathBuf,

    /// Output GTF file [default: stdout]
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Decision-log CSV [default: <output>.stats.csv, or unify_stats.csv with stdout]
    #[arg(short = 's', long = "stats")]
    stats: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// GTF attribute holding the locus id
    #[arg(long = "locus-key", default_value = "locus")]
    locus_key: String,

    /// Source tag of the reference annotation
    #[arg(long = "reference-source", default_value = "ensembl")]
    reference_source: String,

    /// Source tag of the transcript assembler
    #[arg(long = "assembly-source", default_value = "StringTie")]
    assembly_source: String,

    /// Substring marking an assembled transcript id as a reference id
    #[arg(long = "reference-marker", default_value = "ENS")]
    reference_marker: String,

    /// Exon signature comparison: membership or positional
    #[arg(short = 'm', long = "match-mode", default_value = "membership")]
    match_mode: MatchMode,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let start = Instant::now();

    let level = if args.debug { Level::Debug } else { Level::Info };
    simple_logger::init_with_level(level).context("Failed to initialise logging")?;

    if !args.input.exists() {
        bail!("GTF file not found: {}", args.input.display());
    }
    if args.locus_key.is_empty() {
        bail!("The locus key cannot be empty.");
    }

    let config = Config {
        reference_source: args.reference_source.clone(),
        assembly_source: args.assembly_source.clone(),
        reference_marker: args.reference_marker.clone(),
        locus_key: args.locus_key.clone(),
        match_mode: args.match_mode,
        ..Config::default()
    };

    info!("Reading GTF file: {}", args.input.display());
    let reader = GtfReader::from_path(&args.input)
        .with_context(|| format!("Failed to open GTF file {}", args.input.display()))?
        .with_locus_key(&config.locus_key);

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => {
            info!("Writing output to: {}", path.display());
            let file = File::create(path).context("Failed to create output file")?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut unifier = Unifier::new(&config, GtfWriter::new(sink));
    if !args.debug {
        // Debug output is per locus; a spinner between those lines only flickers
        unifier = unifier.with_progress(locus_spinner());
    }
    unifier.run(reader)?;
    let output = unifier.finish()?;

    let mut writer = output.sink;
    writer.flush()?;

    let stats_path = stats_path(&args);
    info!("Writing decision log to: {}", stats_path.display());
    let file = File::create(&stats_path).context("Failed to create stats file")?;
    let mut stats_writer = BufWriter::new(file);
    output.stats.write_csv(&mut stats_writer)?;
    stats_writer.flush()?;

    let summary = &output.summary;
    info!(
        "{} loci ({} trusted, {} empty, {} abandoned): kept {} of {} transcripts, {} records written",
        summary.loci,
        summary.short_circuit_loci,
        summary.empty_loci,
        summary.abandoned_loci,
        summary.transcripts_kept,
        summary.transcripts_seen,
        summary.records_written
    );
    if summary.malformed_records > 0 {
        info!(
            "{} malformed records, {} records skipped",
            summary.malformed_records, summary.skipped_records
        );
    }
    info!("Done in {:.3?}", start.elapsed());
    Ok(())
}

/// Decision-log path: explicit, next to the output GTF, or the default file.
fn stats_path(args: &Args) -> PathBuf {
    if let Some(path) = &args.stats {
        return path.clone();
    }
    match &args.output {
        Some(output) => output.with_extension("stats.csv"),
        None => Path::new(DEFAULT_STATS_FILE).to_path_buf(),
    }
}

fn locus_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = "{spinner} [{elapsed_precise}] {pos} loci {msg}";
    if let Ok(style) = ProgressStyle::default_spinner().template(template) {
        pb.set_style(style);
    }
    pb
}
