//! Coarse exon signatures.
//!
//! Assemblies of the same transcript disagree by a few bases at exon
//! boundaries. Rounding every boundary to a bucket whose width grows with the
//! coordinate absorbs that noise without aligning anything.

use ahash::AHashSet;

use crate::config::MatchMode;
use crate::types::Exon;

/// Round a coordinate into its tolerance bucket.
///
/// Values above 100 are divided by 100, values above 10 by 10, smaller values
/// are kept. Halves round to even.
pub fn coarsen(x: i64) -> i64 {
    if x > 100 {
        (x as f64 / 100.0).round_ties_even() as i64
    } else if x > 10 {
        (x as f64 / 10.0).round_ties_even() as i64
    } else {
        x
    }
}

/// Coarsened `(start, end)` pairs of a transcript, in exon order.
#[derive(Debug, Clone)]
pub struct ExonSignature {
    pairs: Vec<(i64, i64)>,
    members: AHashSet<(i64, i64)>,
}

impl ExonSignature {
    pub fn from_exons(exons: &[Exon]) -> Self {
        let pairs: Vec<(i64, i64)> = exons
            .iter()
            .map(|e| (coarsen(e.start), coarsen(e.end)))
            .collect();
        let members = pairs.iter().copied().collect();
        ExonSignature { pairs, members }
    }

    /// Number of exons the signature was built from.
    pub fn exon_count(&self) -> usize {
        self.pairs.len()
    }

    /// Whether a transcript with this signature restates `kept`.
    ///
    /// Exon counts must agree. In membership mode every pair of `self` must
    /// occur somewhere in `kept`; in positional mode pairs are compared index
    /// by index.
    pub fn is_duplicate_of(&self, kept: &ExonSignature, mode: MatchMode) -> bool {
        if self.exon_count() != kept.exon_count() {
            return false;
        }
        match mode {
            MatchMode::Membership => self.pairs.iter().all(|p| kept.members.contains(p)),
            MatchMode::Positional => self.pairs == kept.pairs,
        }
    }
}
