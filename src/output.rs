//! Output formatting for gtfunify results.
//!
//! Emitted records go through a [`RecordSink`]; the GTF writer is the one the
//! binary uses. The decision log is written as CSV.

use anyhow::Result;

use std::io::Write;

use crate::stats::StatsRow;
use crate::types::Feature;

const STATS_HEADER: &str = "locus,transcript_id,source,exon_count,size,added,gene_name";

/// Destination of emitted records.
pub trait RecordSink {
    fn write_feature(&mut self, feature: &Feature) -> Result<()>;
}

/// Collects records in memory.
impl RecordSink for Vec<Feature> {
    fn write_feature(&mut self, feature: &Feature) -> Result<()> {
        self.push(feature.clone());
        Ok(())
    }
}

/// Writes records as GTF lines.
pub struct GtfWriter<W: Write> {
    writer: W,
}

impl<W: Write> GtfWriter<W> {
    pub fn new(writer: W) -> Self {
        GtfWriter { writer }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> RecordSink for GtfWriter<W> {
    fn write_feature(&mut self, feature: &Feature) -> Result<()> {
        writeln!(self.writer, "{}", format_gtf_line(feature))?;
        Ok(())
    }
}

/// Format a feature as one GTF line (no trailing newline).
///
/// Every attribute value is quoted; repeated keys are written once per value.
pub fn format_gtf_line(feature: &Feature) -> String {
    let attributes: Vec<String> = feature
        .attributes
        .iter()
        .map(|(key, value)| format!("{} \"{}\";", key, value))
        .collect();

    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        feature.seqname,
        feature.source,
        feature.kind,
        feature.start,
        feature.end,
        feature.score,
        feature.strand,
        feature.frame,
        attributes.join(" ")
    )
}

/// Write the decision-log header.
pub fn write_stats_header<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", STATS_HEADER)?;
    Ok(())
}

/// Format a single decision-log row as CSV.
pub fn format_stats_row(row: &StatsRow) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        csv_field(&row.locus),
        csv_field(&row.transcript_id),
        csv_field(&row.source),
        row.exon_count,
        row.size,
        u8::from(row.added),
        csv_field(&row.gene_name)
    )
}

/// Quote a CSV field when it contains a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
