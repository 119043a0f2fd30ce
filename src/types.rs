//! Core data structures for gtfunify.
//!
//! This module contains the feature record read from and written to GTF,
//! together with the small value types it is built from.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Strand orientation for genomic features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Positive,
    Negative,
    Unknown,
}

/// Error type for parsing strand from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStrandError;

impl fmt::Display for ParseStrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid strand: expected '+', '-' or '.'")
    }
}

impl std::error::Error for ParseStrandError {}

impl FromStr for Strand {
    type Err = ParseStrandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Positive),
            "-" => Ok(Strand::Negative),
            "." => Ok(Strand::Unknown),
            _ => Err(ParseStrandError),
        }
    }
}

impl Strand {
    /// Convert strand to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Positive => "+",
            Strand::Negative => "-",
            Strand::Unknown => ".",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Feature type column of a GTF record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Gene,
    Transcript,
    Exon,
    /// CDS, UTR, start_codon and anything else we carry but do not model.
    Other(String),
}

impl FeatureKind {
    pub fn as_str(&self) -> &str {
        match self {
            FeatureKind::Gene => "gene",
            FeatureKind::Transcript => "transcript",
            FeatureKind::Exon => "exon",
            FeatureKind::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for FeatureKind {
    fn from(s: &str) -> Self {
        match s {
            "gene" => FeatureKind::Gene,
            "transcript" => FeatureKind::Transcript,
            "exon" => FeatureKind::Exon,
            other => FeatureKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered GTF attribute column.
///
/// A key may repeat in GTF (`tag "basic"; tag "CCDS";`), so every key maps to
/// the list of its values in file order. Insertion order of keys is kept so a
/// record is written back the way it was read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, Vec<String>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    /// First value for `key` when it is present and not empty.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Append a value, keeping any values already stored under `key`.
    pub fn push(&mut self, key: &str, value: &str) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// Replace all values of `key` with a single value.
    ///
    /// An existing key keeps its position; a new key goes last.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.get_mut(key) {
            Some(values) => {
                values.clear();
                values.push(value.to_string());
            }
            None => {
                self.entries.insert(key.to_string(), vec![value.to_string()]);
            }
        }
    }

    /// Iterate `(key, value)` pairs, repeated keys yielding once per value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }
}

/// A single GTF record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub seqname: String,
    pub source: String,
    pub kind: FeatureKind,
    /// 1-based inclusive start.
    pub start: i64,
    /// 1-based inclusive end, never below `start`.
    pub end: i64,
    pub score: String,
    pub strand: Strand,
    pub frame: String,
    pub attributes: Attributes,
}

impl Feature {
    /// Create a feature with empty score/frame columns and no attributes.
    pub fn new(
        seqname: &str,
        source: &str,
        kind: FeatureKind,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Self {
        Feature {
            seqname: seqname.to_string(),
            source: source.to_string(),
            kind,
            start,
            end,
            score: ".".to_string(),
            strand,
            frame: ".".to_string(),
            attributes: Attributes::new(),
        }
    }

    /// Shorthand for the first value of an attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    pub fn transcript_id(&self) -> Option<&str> {
        self.attributes.get_non_empty("transcript_id")
    }
}

/// An exon interval within a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exon {
    pub start: i64,
    pub end: i64,
}

impl Exon {
    /// Create a new exon with start and end coordinates.
    pub fn new(start: i64, end: i64) -> Self {
        Exon { start, end }
    }

    /// Distance between the boundaries, as the consolidation size measure uses it.
    pub fn span(&self) -> i64 {
        (self.end - self.start).abs()
    }
}
