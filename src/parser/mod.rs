//! Readers for genomic annotation files.

pub mod gtf;
pub mod util;

pub use gtf::{parse_attributes, parse_gtf_line, GtfReader};
