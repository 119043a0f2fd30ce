//! gtfunify - consolidate multi-source gene models per locus.
//!
//! This library reads a locus-sorted GTF stream (for example the output of
//! `gffread --cluster-only`), and for each locus emits one consolidated gene
//! and a non-redundant set of transcripts, together with a per-transcript
//! decision log.
//!
//! # Features
//!
//! - Stream GTF files (with gzip support), one locus in memory at a time
//! - Keep every transcript of loci that contain reference-backed models
//! - Collapse near-identical assembled transcripts using coarse exon signatures
//! - Resolve the locus gene name by majority vote and propagate reference ids
//! - Write the decision log as CSV
//!
//! # Example
//!
//! ```ignore
//! use gtfunify::config::Config;
//! use gtfunify::output::GtfWriter;
//! use gtfunify::parser::GtfReader;
//! use gtfunify::pipeline::unify;
//! use std::path::Path;
//!
//! let config = Config::default();
//! let reader = GtfReader::from_path(Path::new("clustered.gtf"))?;
//! let output = unify(reader, &config, GtfWriter::new(std::io::stdout()))?;
//! output.stats.write_csv(&mut std::fs::File::create("stats.csv")?)?;
//! ```

pub mod config;
pub mod consolidate;
pub mod error;
pub mod locus;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
pub mod types;

pub use config::{Config, MatchMode};
pub use error::UnifyError;
pub use parser::GtfReader;
pub use pipeline::{unify, RunSummary, Unifier};
pub use types::{Attributes, Exon, Feature, FeatureKind, Strand};
