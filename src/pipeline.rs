//! Streaming driver: partition, resolve and emit one locus at a time.
//!
//! All run-wide state (the open locus, the decision log, counters) lives in
//! [`Unifier`]; nothing is carried from one locus into the next.

use anyhow::Result;
use indicatif::ProgressBar;
use log::{debug, error};

use crate::config::Config;
use crate::consolidate::{classify_transcripts, consolidate, Decision};
use crate::error::UnifyError;
use crate::locus::{Locus, LocusHierarchy, LocusPartitioner};
use crate::output::RecordSink;
use crate::stats::{StatsRow, StatsTable};
use crate::types::Feature;

/// Everything one locus contributes to the output.
#[derive(Debug, Clone)]
pub struct LocusOutcome {
    pub locus_id: String,
    /// `None` when the locus had no transcript to consolidate.
    pub decision: Option<Decision>,
    /// Gene record first, then the exons of each kept transcript.
    pub records: Vec<Feature>,
    /// One row per classified transcript.
    pub stats: Vec<StatsRow>,
}

/// Build, classify, consolidate and annotate one finalized locus.
pub fn resolve_locus(locus: Locus, config: &Config) -> LocusOutcome {
    let hierarchy = LocusHierarchy::build(locus, config);
    let locus_id = hierarchy.locus_id.clone();

    if hierarchy.is_empty() {
        debug!("Locus {} has no transcripts with exons, nothing emitted", locus_id);
        return LocusOutcome {
            locus_id,
            decision: None,
            records: Vec::new(),
            stats: Vec::new(),
        };
    }

    let (contexts, signals) = classify_transcripts(hierarchy.transcripts(), config);
    let consolidation = consolidate(&contexts, config.match_mode);
    let annotation = signals.resolve();
    let novel = !consolidation.is_short_circuit();

    let gene_name = annotation
        .gene_name
        .clone()
        .unwrap_or_else(|| config.missing_gene_name.clone());
    let stats = contexts
        .iter()
        .enumerate()
        .map(|(i, ctx)| StatsRow {
            locus: locus_id.clone(),
            transcript_id: ctx.id.clone(),
            source: ctx.source.clone(),
            exon_count: ctx.exon_count,
            size: ctx.size,
            added: consolidation.is_kept(i),
            gene_name: gene_name.clone(),
        })
        .collect();

    let (mut gene, mut nodes) = hierarchy.into_parts();
    annotation.stamp(&mut gene, &locus_id, novel, config);

    let mut records = vec![gene];
    for &i in &consolidation.kept {
        for mut exon in std::mem::take(&mut nodes[i].exons) {
            annotation.stamp(&mut exon, &locus_id, novel, config);
            records.push(exon);
        }
    }

    debug!(
        "Locus {}: {:?}, kept {} of {} transcripts",
        locus_id,
        consolidation.decision,
        consolidation.kept.len(),
        contexts.len()
    );

    LocusOutcome {
        locus_id,
        decision: Some(consolidation.decision),
        records,
        stats,
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub loci: usize,
    pub empty_loci: usize,
    pub short_circuit_loci: usize,
    pub abandoned_loci: usize,
    pub malformed_records: usize,
    pub skipped_records: usize,
    pub transcripts_seen: usize,
    pub transcripts_kept: usize,
    pub records_written: usize,
}

/// What a finished run hands back.
pub struct UnifyOutput<S> {
    pub sink: S,
    pub stats: StatsTable,
    pub summary: RunSummary,
}

/// Single-pass locus consolidation over a record stream.
pub struct Unifier<'c, S: RecordSink> {
    config: &'c Config,
    sink: S,
    partitioner: LocusPartitioner,
    stats: StatsTable,
    summary: RunSummary,
    progress: Option<ProgressBar>,
}

impl<'c, S: RecordSink> Unifier<'c, S> {
    pub fn new(config: &'c Config, sink: S) -> Self {
        Unifier {
            config,
            sink,
            partitioner: LocusPartitioner::new(&config.locus_key),
            stats: StatsTable::new(),
            summary: RunSummary::default(),
            progress: None,
        }
    }

    /// Tick `progress` once per finalized locus.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Feed one record, resolving the previous locus if this one opens a new locus.
    pub fn push(&mut self, feature: Feature) -> Result<()> {
        if let Some(locus) = self.partitioner.push(feature) {
            self.finalize(locus)?;
        }
        Ok(())
    }

    /// Abandon the locus a record that could not be parsed belongs to.
    ///
    /// When the bad line names a locus other than the open one, the open locus
    /// is complete and is resolved first. Without a recoverable id the open
    /// locus is the one abandoned.
    pub fn reject(&mut self, err: &UnifyError) -> Result<()> {
        self.summary.malformed_records += 1;

        let abandoned = match err.locus_id() {
            Some(id) if self.partitioner.current_id() != Some(id) => {
                if let Some(locus) = self.partitioner.close() {
                    self.finalize(locus)?;
                }
                self.partitioner.abandon_id(id).then(|| id.to_string())
            }
            _ => self.partitioner.abandon(),
        };

        self.suspend_progress(|| match &abandoned {
            Some(id) => error!("{}; abandoning locus {}", err, id),
            None => error!("{}", err),
        });
        if abandoned.is_some() {
            self.summary.abandoned_loci += 1;
        }
        Ok(())
    }

    /// Consume a record stream. Malformed records are recovered from, I/O errors are not.
    pub fn run<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = crate::error::Result<Feature>>,
    {
        for record in records {
            match record {
                Ok(feature) => self.push(feature)?,
                Err(err) if err.is_recoverable() => self.reject(&err)?,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Keep log lines from tearing the spinner.
    fn suspend_progress<F: FnOnce()>(&self, f: F) {
        match &self.progress {
            Some(progress) => progress.suspend(f),
            None => f(),
        }
    }

    /// Resolve the last locus and hand back the sink, decision log and counters.
    pub fn finish(mut self) -> Result<UnifyOutput<S>> {
        if let Some(locus) = self.partitioner.finish() {
            self.finalize(locus)?;
        }
        self.summary.skipped_records = self.partitioner.skipped();
        if let Some(progress) = &self.progress {
            progress.finish_with_message(format!(
                "{} loci, kept {} of {} transcripts",
                self.summary.loci, self.summary.transcripts_kept, self.summary.transcripts_seen
            ));
        }
        Ok(UnifyOutput {
            sink: self.sink,
            stats: self.stats,
            summary: self.summary,
        })
    }

    fn finalize(&mut self, locus: Locus) -> Result<()> {
        let outcome = resolve_locus(locus, self.config);

        self.summary.loci += 1;
        match outcome.decision {
            None => self.summary.empty_loci += 1,
            Some(Decision::TrustedShortCircuit) => self.summary.short_circuit_loci += 1,
            Some(Decision::Deduplicated) => {}
        }
        self.summary.transcripts_seen += outcome.stats.len();
        self.summary.transcripts_kept += outcome.stats.iter().filter(|r| r.added).count();

        for record in &outcome.records {
            self.sink.write_feature(record)?;
        }
        self.summary.records_written += outcome.records.len();
        self.stats.extend(outcome.stats);

        if let Some(progress) = &self.progress {
            progress.inc(1);
        }
        Ok(())
    }
}

/// Run a whole record stream through a fresh [`Unifier`].
pub fn unify<I, S>(records: I, config: &Config, sink: S) -> Result<UnifyOutput<S>>
where
    I: IntoIterator<Item = crate::error::Result<Feature>>,
    S: RecordSink,
{
    let mut unifier = Unifier::new(config, sink);
    unifier.run(records)?;
    unifier.finish()
}
