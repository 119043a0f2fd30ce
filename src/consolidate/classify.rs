//! Transcript classification.
//!
//! Measures each transcript, decides whether its provenance is trusted, and
//! collects the gene-level signals the resolver votes on.

use crate::config::Config;
use crate::consolidate::resolve::GeneSignals;
use crate::locus::TranscriptNode;
use crate::types::Exon;

/// What the consolidation engine knows about one transcript.
#[derive(Debug, Clone)]
pub struct TranscriptContext {
    pub id: String,
    pub source: String,
    /// Exempt from deduplication.
    pub trusted: bool,
    /// Sum of `|end - start|` over the exons.
    pub size: i64,
    pub exon_count: usize,
    /// Exons in ascending start order.
    pub exons: Vec<Exon>,
    pub gene_name: Option<String>,
    pub ref_gene_id: Option<String>,
}

impl TranscriptContext {
    /// Classify a transcript node. The node's exons are already sorted.
    pub fn from_node(node: &TranscriptNode, config: &Config) -> Self {
        let exons: Vec<Exon> = node
            .exons
            .iter()
            .map(|e| Exon::new(e.start, e.end))
            .collect();
        let source = node.record.source.clone();
        let attrs = &node.record.attributes;

        TranscriptContext {
            trusted: config.is_trusted(&source, &node.id),
            id: node.id.clone(),
            source,
            size: exons.iter().map(Exon::span).sum(),
            exon_count: exons.len(),
            exons,
            gene_name: attrs.get_non_empty("gene_name").map(|s| s.to_string()),
            ref_gene_id: attrs.get_non_empty("ref_gene_id").map(|s| s.to_string()),
        }
    }

    /// Ranking key: bigger, then more fragmented, first.
    pub fn rank_key(&self) -> (i64, usize) {
        (self.size, self.exon_count)
    }
}

/// Classify every transcript of a locus, in input order.
pub fn classify_transcripts(
    nodes: &[TranscriptNode],
    config: &Config,
) -> (Vec<TranscriptContext>, GeneSignals) {
    let mut signals = GeneSignals::new();
    let contexts = nodes
        .iter()
        .map(|node| {
            let ctx = TranscriptContext::from_node(node, config);
            signals.observe(ctx.gene_name.as_deref(), ctx.ref_gene_id.as_deref());
            ctx
        })
        .collect();
    (contexts, signals)
}
