//! Per-transcript decision log.

use anyhow::Result;
use std::io::Write;

use crate::output::{format_stats_row, write_stats_header};

/// One row of the decision log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    pub locus: String,
    pub transcript_id: String,
    pub source: String,
    pub exon_count: usize,
    pub size: i64,
    /// Whether the transcript made it into the output.
    pub added: bool,
    pub gene_name: String,
}

/// Rows of every classified transcript, in processing order.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    rows: Vec<StatsRow>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: StatsRow) {
        self.rows.push(row);
    }

    pub fn extend<I: IntoIterator<Item = StatsRow>>(&mut self, rows: I) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[StatsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as CSV with a header line.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_stats_header(writer)?;
        for row in &self.rows {
            writeln!(writer, "{}", format_stats_row(row))?;
        }
        Ok(())
    }
}
