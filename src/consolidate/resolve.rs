//! Gene-level annotation of a locus.
//!
//! The locus takes the gene name most transcripts agree on and the first
//! reference gene id any transcript points to.

use indexmap::IndexMap;

use crate::config::Config;
use crate::types::Feature;

/// Gene-name votes and reference-id hints gathered while classifying.
#[derive(Debug, Clone, Default)]
pub struct GeneSignals {
    /// Vote count per gene name, in order of first appearance.
    name_votes: IndexMap<String, usize>,
    ref_gene_id: Option<String>,
}

impl GeneSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the signals of one transcript.
    pub fn observe(&mut self, gene_name: Option<&str>, ref_gene_id: Option<&str>) {
        if let Some(name) = gene_name {
            *self.name_votes.entry(name.to_string()).or_insert(0) += 1;
        }
        if self.ref_gene_id.is_none() {
            self.ref_gene_id = ref_gene_id.map(|s| s.to_string());
        }
    }

    /// Majority gene name; ties go to the name seen first.
    pub fn majority_name(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (name, &count) in &self.name_votes {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((name.as_str(), count)),
            }
        }
        best.map(|(name, _)| name)
    }

    pub fn resolve(&self) -> GeneAnnotation {
        GeneAnnotation {
            gene_name: self.majority_name().map(|s| s.to_string()),
            ref_gene_id: self.ref_gene_id.clone(),
        }
    }
}

/// Resolved gene name and reference id of a locus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneAnnotation {
    pub gene_name: Option<String>,
    pub ref_gene_id: Option<String>,
}

impl GeneAnnotation {
    /// `gene_id` the consolidated gene is emitted under.
    pub fn gene_id<'a>(&'a self, locus_id: &'a str) -> &'a str {
        self.ref_gene_id.as_deref().unwrap_or(locus_id)
    }

    /// Stamp the gene-level attributes onto the synthesized gene or a retained exon.
    ///
    /// Transcript records are never stamped. `novel` loci also get the novel biotype.
    pub fn stamp(&self, feature: &mut Feature, locus_id: &str, novel: bool, config: &Config) {
        feature.attributes.set("gene_id", self.gene_id(locus_id));
        if let Some(name) = &self.gene_name {
            feature.attributes.set("gene_name", name);
        }
        if let Some(ref_id) = &self.ref_gene_id {
            feature.attributes.set("ref_gene_id", ref_id);
        }
        feature.attributes.set(&config.locus_key, locus_id);
        if novel {
            feature.attributes.set("gene_biotype", &config.novel_biotype);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureKind, Strand};

    #[test]
    fn test_majority_vote() {
        let mut signals = GeneSignals::new();
        for name in ["B", "A", "A", "A"] {
            signals.observe(Some(name), None);
        }
        assert_eq!(signals.majority_name(), Some("A"));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let mut signals = GeneSignals::new();
        for name in ["B", "A", "A", "B"] {
            signals.observe(Some(name), None);
        }
        assert_eq!(signals.majority_name(), Some("B"));
    }

    #[test]
    fn test_no_votes() {
        let mut signals = GeneSignals::new();
        signals.observe(None, None);
        assert_eq!(signals.resolve(), GeneAnnotation::default());
    }

    #[test]
    fn test_first_ref_gene_id_wins() {
        let mut signals = GeneSignals::new();
        signals.observe(None, None);
        signals.observe(None, Some("ENSG1"));
        signals.observe(None, Some("ENSG2"));
        assert_eq!(signals.resolve().ref_gene_id.as_deref(), Some("ENSG1"));
    }

    #[test]
    fn test_stamp_exon() {
        let config = Config::default();
        let annotation = GeneAnnotation {
            gene_name: Some("TP53".to_string()),
            ref_gene_id: Some("ENSG00000141510".to_string()),
        };
        let mut exon = Feature::new(
            "chr17",
            "StringTie",
            FeatureKind::Exon,
            10,
            20,
            Strand::Negative,
        );
        exon.attributes.push("gene_id", "MSTRG.5");
        exon.attributes.push("transcript_id", "MSTRG.5.1");

        annotation.stamp(&mut exon, "RLOC_3", true, &config);

        assert_eq!(exon.attribute("gene_id"), Some("ENSG00000141510"));
        assert_eq!(exon.attribute("transcript_id"), Some("MSTRG.5.1"));
        assert_eq!(exon.attribute("gene_name"), Some("TP53"));
        assert_eq!(exon.attribute("ref_gene_id"), Some("ENSG00000141510"));
        assert_eq!(exon.attribute("locus"), Some("RLOC_3"));
        assert_eq!(exon.attribute("gene_biotype"), Some("novel"));
    }

    #[test]
    fn test_stamp_without_annotation_keeps_placeholders() {
        let config = Config::default();
        let mut gene = Feature::new("chr1", "guessed", FeatureKind::Gene, 1, 5, Strand::Positive);
        gene.attributes.set("gene_name", "RLOC_9");
        gene.attributes.set("gene_biotype", "unknown");

        GeneAnnotation::default().stamp(&mut gene, "RLOC_9", false, &config);

        assert_eq!(gene.attribute("gene_id"), Some("RLOC_9"));
        assert_eq!(gene.attribute("gene_name"), Some("RLOC_9"));
        assert_eq!(gene.attribute("gene_biotype"), Some("unknown"));
        assert!(!gene.attributes.contains("ref_gene_id"));
    }
}
