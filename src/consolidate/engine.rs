//! Transcript deduplication.
//!
//! A locus with any trusted transcript keeps everything. Otherwise candidates
//! are ranked by size and exon count and accepted greedily unless their coarse
//! exon signature restates a transcript already kept.

use log::debug;

use crate::config::MatchMode;
use crate::consolidate::classify::TranscriptContext;
use crate::consolidate::signature::ExonSignature;

/// How the kept set of a locus was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At least one trusted transcript: nothing was deduplicated.
    TrustedShortCircuit,
    /// Non-trusted transcripts went through ranking and greedy acceptance.
    Deduplicated,
}

/// Result of consolidating one locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consolidation {
    pub decision: Decision,
    /// Indices into the classified transcripts, in emission order.
    pub kept: Vec<usize>,
}

impl Consolidation {
    pub fn is_kept(&self, index: usize) -> bool {
        self.kept.contains(&index)
    }

    pub fn is_short_circuit(&self) -> bool {
        self.decision == Decision::TrustedShortCircuit
    }
}

/// Decide the representative transcripts of a locus.
///
/// Total: an empty input gives an empty kept set, any other input at least one
/// kept transcript.
pub fn consolidate(contexts: &[TranscriptContext], mode: MatchMode) -> Consolidation {
    if contexts.iter().any(|c| c.trusted) {
        return Consolidation {
            decision: Decision::TrustedShortCircuit,
            kept: (0..contexts.len()).collect(),
        };
    }

    let ranked = rank_candidates(contexts);
    let kept = greedy_accept(contexts, &ranked, Vec::new(), mode);
    Consolidation {
        decision: Decision::Deduplicated,
        kept,
    }
}

/// Indices of the non-trusted transcripts, largest `(size, exon_count)` first.
///
/// The sort is stable, so equal keys keep input order.
pub fn rank_candidates(contexts: &[TranscriptContext]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..contexts.len())
        .filter(|&i| !contexts[i].trusted)
        .collect();
    order.sort_by(|&a, &b| contexts[b].rank_key().cmp(&contexts[a].rank_key()));
    order
}

/// Walk `ranked` and keep each candidate that duplicates nothing kept so far.
///
/// `seed` holds transcripts kept before the walk starts.
pub fn greedy_accept(
    contexts: &[TranscriptContext],
    ranked: &[usize],
    seed: Vec<usize>,
    mode: MatchMode,
) -> Vec<usize> {
    let mut kept_signatures: Vec<ExonSignature> = seed
        .iter()
        .map(|&i| ExonSignature::from_exons(&contexts[i].exons))
        .collect();
    let mut kept = seed;

    for &i in ranked {
        let signature = ExonSignature::from_exons(&contexts[i].exons);
        let duplicate_of = kept_signatures
            .iter()
            .position(|k| signature.is_duplicate_of(k, mode));

        match duplicate_of {
            Some(k) => debug!(
                "Transcript {} duplicates {}, discarded",
                contexts[i].id, contexts[kept[k]].id
            ),
            None => {
                kept.push(i);
                kept_signatures.push(signature);
            }
        }
    }

    kept
}
