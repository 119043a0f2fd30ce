//! Locus partitioning of the feature stream.
//!
//! The input is sorted by locus already; a locus ends where the next locus id
//! appears. Records without a locus id (exons, usually) belong to the locus
//! that is open when they are read.

pub mod hierarchy;

pub use hierarchy::{synthesize_gene, LocusHierarchy, TranscriptNode};

use log::{debug, warn};

use crate::types::{Feature, Strand};

/// All records of one locus plus the span they cover.
#[derive(Debug, Clone)]
pub struct Locus {
    pub id: String,
    pub seqname: String,
    pub strand: Strand,
    /// Minimum start over all member records.
    pub start: i64,
    /// Maximum end over all member records.
    pub end: i64,
    pub features: Vec<Feature>,
}

impl Locus {
    /// Open a locus seeded by its first record.
    pub fn open(id: String, first: Feature) -> Self {
        Locus {
            id,
            seqname: first.seqname.clone(),
            strand: first.strand,
            start: first.start,
            end: first.end,
            features: vec![first],
        }
    }

    /// Fold a record into the locus.
    pub fn add(&mut self, feature: Feature) {
        if feature.start < self.start {
            self.start = feature.start;
        }
        if feature.end > self.end {
            self.end = feature.end;
        }
        self.features.push(feature);
    }
}

/// Splits an ordered record stream into loci.
///
/// Holds at most one open locus. [`push`](Self::push) hands back the previous
/// locus once a record with a new locus id arrives; [`finish`](Self::finish)
/// hands back the last one.
pub struct LocusPartitioner {
    locus_key: String,
    current: Option<Locus>,
    /// Id of a locus dropped after a malformed record; its remaining records are skipped.
    abandoned: Option<String>,
    skipped: usize,
}

impl LocusPartitioner {
    pub fn new(locus_key: &str) -> Self {
        LocusPartitioner {
            locus_key: locus_key.to_string(),
            current: None,
            abandoned: None,
            skipped: 0,
        }
    }

    /// Id of the locus currently being buffered.
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_ref().map(|l| l.id.as_str())
    }

    /// Number of records skipped so far (orphans before any locus, or members of abandoned loci).
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Feed one record. Returns the finished locus when `feature` opens a new one.
    pub fn push(&mut self, feature: Feature) -> Option<Locus> {
        let id = feature
            .attributes
            .get_non_empty(&self.locus_key)
            .map(|s| s.to_string());

        match id {
            Some(id) => {
                if let Some(current) = self.current.as_mut() {
                    if current.id == id {
                        current.add(feature);
                        return None;
                    }
                }
                if self.abandoned.as_deref() == Some(id.as_str()) {
                    self.skipped += 1;
                    return None;
                }
                self.abandoned = None;
                self.current.replace(Locus::open(id, feature))
            }
            None => {
                if let Some(current) = self.current.as_mut() {
                    current.add(feature);
                } else if self.abandoned.is_some() {
                    self.skipped += 1;
                } else {
                    warn!(
                        "Skipping {} {}:{}-{} with no '{}' attribute before the first locus",
                        feature.kind, feature.seqname, feature.start, feature.end, self.locus_key
                    );
                    self.skipped += 1;
                }
                None
            }
        }
    }

    /// Drop the open locus; its remaining records are skipped until the next locus id.
    ///
    /// Returns the id of the dropped locus.
    pub fn abandon(&mut self) -> Option<String> {
        let dropped = self.current.take()?;
        debug!(
            "Abandoning locus {} after {} records",
            dropped.id,
            dropped.features.len()
        );
        self.abandoned = Some(dropped.id.clone());
        Some(dropped.id)
    }

    /// Mark `id` as abandoned before any of its records was buffered.
    ///
    /// Used when the first record of a locus is the malformed one. Returns
    /// `false` when `id` was already abandoned.
    pub fn abandon_id(&mut self, id: &str) -> bool {
        if self.abandoned.as_deref() == Some(id) {
            return false;
        }
        debug!("Abandoning locus {} at its first record", id);
        self.abandoned = Some(id.to_string());
        true
    }

    /// Hand back the open locus without waiting for the next locus id.
    pub fn close(&mut self) -> Option<Locus> {
        self.current.take()
    }

    /// Hand back the last open locus at end of stream.
    pub fn finish(&mut self) -> Option<Locus> {
        self.abandoned = None;
        self.current.take()
    }
}
