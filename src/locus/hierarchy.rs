//! Per-locus gene → transcript → exon hierarchy.
//!
//! Replaces a general feature database: the index only lives while one locus
//! is being resolved.

use ahash::AHashMap;
use log::debug;

use crate::config::Config;
use crate::locus::Locus;
use crate::types::{Feature, FeatureKind};

/// A transcript record and its exons, sorted by start.
#[derive(Debug, Clone)]
pub struct TranscriptNode {
    pub id: String,
    pub record: Feature,
    pub exons: Vec<Feature>,
}

/// The hierarchy of one locus, rooted at a synthesized gene.
#[derive(Debug, Clone)]
pub struct LocusHierarchy {
    pub locus_id: String,
    pub gene: Feature,
    transcripts: Vec<TranscriptNode>,
    index: AHashMap<String, usize>,
    /// Transcripts dropped because no exon referenced them.
    pub dropped: Vec<String>,
    /// Exons whose transcript has no transcript record in the locus.
    pub orphan_exons: usize,
}

/// Build the placeholder gene record spanning the whole locus.
pub fn synthesize_gene(locus: &Locus, config: &Config) -> Feature {
    let mut gene = Feature::new(
        &locus.seqname,
        &config.placeholder_source,
        FeatureKind::Gene,
        locus.start,
        locus.end,
        locus.strand,
    );
    gene.attributes.set("gene_id", &locus.id);
    gene.attributes.set("gene_name", &locus.id);
    gene.attributes.set("gene_biotype", &config.placeholder_biotype);
    gene.attributes.set(&config.locus_key, &locus.id);
    gene
}

impl LocusHierarchy {
    /// Index the transcripts and exons of a finalized locus.
    ///
    /// Transcripts keep the order in which their records first appear.
    /// Input gene records are not part of the hierarchy.
    pub fn build(locus: Locus, config: &Config) -> Self {
        let gene = synthesize_gene(&locus, config);
        let mut transcripts: Vec<TranscriptNode> = Vec::new();
        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut exons: Vec<Feature> = Vec::new();

        for feature in locus.features {
            match feature.kind {
                FeatureKind::Transcript => {
                    let Some(id) = feature.transcript_id().map(|s| s.to_string()) else {
                        debug!(
                            "Locus {}: transcript at {}:{}-{} has no transcript_id",
                            locus.id, feature.seqname, feature.start, feature.end
                        );
                        continue;
                    };
                    if index.contains_key(&id) {
                        debug!("Locus {}: duplicate transcript record {}", locus.id, id);
                        continue;
                    }
                    index.insert(id.clone(), transcripts.len());
                    transcripts.push(TranscriptNode {
                        id,
                        record: feature,
                        exons: Vec::new(),
                    });
                }
                FeatureKind::Exon => exons.push(feature),
                _ => {}
            }
        }

        let mut orphan_exons = 0;
        for exon in exons {
            let slot = exon.transcript_id().and_then(|id| index.get(id)).copied();
            match slot {
                Some(i) => transcripts[i].exons.push(exon),
                None => {
                    debug!(
                        "Locus {}: exon {}-{} has no transcript record",
                        locus.id, exon.start, exon.end
                    );
                    orphan_exons += 1;
                }
            }
        }

        let mut dropped = Vec::new();
        transcripts.retain_mut(|node| {
            if node.exons.is_empty() {
                debug!("Locus {}: transcript {} has no exons, dropped", locus.id, node.id);
                dropped.push(node.id.clone());
                return false;
            }
            node.exons.sort_by_key(|e| e.start);
            true
        });

        let index = transcripts
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        LocusHierarchy {
            locus_id: locus.id,
            gene,
            transcripts,
            index,
            dropped,
            orphan_exons,
        }
    }

    /// Transcripts with at least one exon, in input order.
    pub fn transcripts(&self) -> &[TranscriptNode] {
        &self.transcripts
    }

    pub fn transcript(&self, id: &str) -> Option<&TranscriptNode> {
        self.index.get(id).map(|&i| &self.transcripts[i])
    }

    /// Exons of a transcript in ascending start order.
    pub fn exons(&self, id: &str) -> Option<&[Feature]> {
        self.transcript(id).map(|node| node.exons.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Split into the gene and the transcript nodes for emission.
    pub fn into_parts(self) -> (Feature, Vec<TranscriptNode>) {
        (self.gene, self.transcripts)
    }
}
