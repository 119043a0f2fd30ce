//! Configuration and defaults for gtfunify.
//!
//! This module contains the provenance tags, attribute keys and placeholder
//! values that drive locus consolidation.

use std::fmt;
use std::str::FromStr;

/// Source tag of the reference annotation.
pub const DEFAULT_REFERENCE_SOURCE: &str = "ensembl";
/// Source tag of the genome-guided assembler.
pub const DEFAULT_ASSEMBLY_SOURCE: &str = "StringTie";
/// Substring marking an assembled transcript id as a reference id.
pub const DEFAULT_REFERENCE_MARKER: &str = "ENS";
/// Attribute carrying the locus id (as written by `gffread --cluster-only`).
pub const DEFAULT_LOCUS_KEY: &str = "locus";

/// How a candidate's coarse exon signature is compared to a kept one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Every coarsened pair of the candidate occurs somewhere in the kept set.
    #[default]
    Membership,
    /// The i-th coarsened pair of both transcripts must be equal.
    Positional,
}

/// Error type for parsing match mode from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMatchModeError;

impl fmt::Display for ParseMatchModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid match mode: expected 'membership' or 'positional'")
    }
}

impl std::error::Error for ParseMatchModeError {}

impl FromStr for MatchMode {
    type Err = ParseMatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "membership" => Ok(MatchMode::Membership),
            "positional" => Ok(MatchMode::Positional),
            _ => Err(ParseMatchModeError),
        }
    }
}

/// Configuration for the consolidation process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Transcripts with this source are always trusted.
    pub reference_source: String,
    /// Transcripts with this source are trusted when their id carries `reference_marker`.
    pub assembly_source: String,
    /// Reference-id substring looked for in assembled transcript ids.
    pub reference_marker: String,
    /// Attribute key holding the locus id.
    pub locus_key: String,
    /// Source column of the synthesized gene record.
    pub placeholder_source: String,
    /// `gene_biotype` of the synthesized gene before resolution.
    pub placeholder_biotype: String,
    /// `gene_biotype` stamped on loci without trusted transcripts.
    pub novel_biotype: String,
    /// Gene name written to the statistics table when none was resolved.
    pub missing_gene_name: String,
    /// Signature comparison used by the dedup step.
    pub match_mode: MatchMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            reference_source: DEFAULT_REFERENCE_SOURCE.to_string(),
            assembly_source: DEFAULT_ASSEMBLY_SOURCE.to_string(),
            reference_marker: DEFAULT_REFERENCE_MARKER.to_string(),
            locus_key: DEFAULT_LOCUS_KEY.to_string(),
            placeholder_source: "guessed".to_string(),
            placeholder_biotype: "unknown".to_string(),
            novel_biotype: "novel".to_string(),
            missing_gene_name: "na".to_string(),
            match_mode: MatchMode::Membership,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a transcript of this provenance is exempt from deduplication.
    ///
    /// Both the assembler tag and the id marker are required for assembled
    /// transcripts.
    pub fn is_trusted(&self, source: &str, transcript_id: &str) -> bool {
        source == self.reference_source
            || (source == self.assembly_source
                && !self.reference_marker.is_empty()
                && transcript_id.contains(&self.reference_marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reference_source, "ensembl");
        assert_eq!(config.assembly_source, "StringTie");
        assert_eq!(config.reference_marker, "ENS");
        assert_eq!(config.locus_key, "locus");
        assert_eq!(config.missing_gene_name, "na");
        assert_eq!(config.match_mode, MatchMode::Membership);
    }

    #[test]
    fn test_reference_source_is_trusted() {
        let config = Config::new();
        assert!(config.is_trusted("ensembl", "MSTRG.1.1"));
    }

    #[test]
    fn test_assembly_needs_marker() {
        let config = Config::new();
        assert!(config.is_trusted("StringTie", "ENST00000456328"));
        assert!(!config.is_trusted("StringTie", "MSTRG.12.1"));
    }

    #[test]
    fn test_marker_on_other_source_is_not_trusted() {
        let config = Config::new();
        assert!(!config.is_trusted("miniprot", "ENST00000456328"));
        assert!(!config.is_trusted("guessed", "ENST00000456328"));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let mut config = Config::new();
        config.reference_marker.clear();
        assert!(!config.is_trusted("StringTie", "MSTRG.12.1"));
    }

    #[test]
    fn test_match_mode_parsing() {
        assert_eq!("membership".parse::<MatchMode>(), Ok(MatchMode::Membership));
        assert_eq!("Positional".parse::<MatchMode>(), Ok(MatchMode::Positional));
        assert!("exact".parse::<MatchMode>().is_err());
    }
}
