//! Locus consolidation: classification, deduplication and gene resolution.

pub mod classify;
pub mod engine;
pub mod resolve;
pub mod signature;

pub use classify::{classify_transcripts, TranscriptContext};
pub use engine::{consolidate, Consolidation, Decision};
pub use resolve::{GeneAnnotation, GeneSignals};
pub use signature::{coarsen, ExonSignature};
