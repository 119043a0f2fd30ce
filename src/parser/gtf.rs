//! Streaming GTF parser with gzip support.
//!
//! Turns GTF (Gene Transfer Format) lines into [`Feature`] records one at a
//! time, so a locus can be resolved before the rest of the file is read.

use std::io::BufRead;
use std::path::Path;

use crate::config::DEFAULT_LOCUS_KEY;
use crate::error::{Result, UnifyError};
use crate::parser::util::open_buffered;
use crate::types::{Attributes, Feature, FeatureKind, Strand};

/// Streaming GTF reader.
///
/// Blank lines and `#` comments are skipped. A line that cannot be parsed
/// (bad columns, bad coordinates, invalid UTF-8) is reported as
/// [`UnifyError::MalformedRecord`], tagged with the locus id found in its raw
/// text, and the reader stays usable.
pub struct GtfReader {
    reader: Box<dyn BufRead + Send>,
    locus_key: String,
    line_number: usize,
    buffer: Vec<u8>,
}

impl GtfReader {
    /// Open a GTF file from a path (supports gzip).
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(open_buffered(path)?))
    }

    /// Wrap an already opened reader.
    pub fn new(reader: Box<dyn BufRead + Send>) -> Self {
        GtfReader {
            reader,
            locus_key: DEFAULT_LOCUS_KEY.to_string(),
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Attribute scanned for on malformed lines to tell which locus they belong to.
    pub fn with_locus_key(mut self, locus_key: &str) -> Self {
        self.locus_key = locus_key.to_string();
        self
    }

    /// Read the next record, or `None` at end of input.
    pub fn read_record(&mut self) -> Result<Option<Feature>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            if self.buffer.first() == Some(&b'#') {
                continue;
            }

            let text = match std::str::from_utf8(&self.buffer) {
                Ok(text) => text,
                Err(_) => {
                    let lossy = String::from_utf8_lossy(&self.buffer);
                    let locus = scan_locus_id(&lossy, &self.locus_key);
                    return Err(
                        UnifyError::malformed(self.line_number, "invalid UTF-8").in_locus(locus)
                    );
                }
            };

            let line = text.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            return parse_gtf_line(line).map(Some).map_err(|message| {
                UnifyError::malformed(self.line_number, message)
                    .in_locus(scan_locus_id(line, &self.locus_key))
            });
        }
    }
}

/// Find `key "value"` in raw line text without parsing the record.
///
/// Used on lines that failed to parse, so only the locus they name is lost.
pub fn scan_locus_id(line: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    for (pos, _) in line.match_indices(key) {
        let at_boundary = line[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| c == ';' || c.is_whitespace());
        if !at_boundary {
            continue;
        }
        let rest = line[pos + key.len()..].trim_start_matches([' ', '\t']);
        if let Some(quoted) = rest.strip_prefix('"') {
            if let Some(close) = quoted.find('"') {
                let value = &quoted[..close];
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

impl Iterator for GtfReader {
    type Item = Result<Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Parse one tab-separated GTF line.
///
/// Returns a description of the problem when the line is not a valid record.
pub fn parse_gtf_line(line: &str) -> std::result::Result<Feature, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 9 {
        return Err(format!("expected 9 columns, found {}", fields.len()));
    }

    let start: i64 = fields[3]
        .parse()
        .map_err(|_| format!("invalid start coordinate '{}'", fields[3]))?;
    let end: i64 = fields[4]
        .parse()
        .map_err(|_| format!("invalid end coordinate '{}'", fields[4]))?;
    if start < 1 || end < start {
        return Err(format!("invalid interval {}-{}", start, end));
    }

    let strand: Strand = fields[6].parse().map_err(|e| format!("{}", e))?;
    let attributes = parse_attributes(fields[8])?;

    Ok(Feature {
        seqname: fields[0].to_string(),
        source: fields[1].to_string(),
        kind: FeatureKind::from(fields[2]),
        start,
        end,
        score: fields[5].to_string(),
        strand,
        frame: fields[7].to_string(),
        attributes,
    })
}

/// Parse a GTF attribute column.
///
/// GTF attributes are in the format: key "value"; key value; ...
/// Quoted values may contain spaces and semicolons.
pub fn parse_attributes(column: &str) -> std::result::Result<Attributes, String> {
    let mut attributes = Attributes::new();
    let mut rest = column.trim();

    while !rest.is_empty() {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let key_end = rest
            .find(|c: char| c.is_whitespace() || c == ';')
            .unwrap_or(rest.len());
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start_matches([' ', '\t']);

        let value;
        if let Some(quoted) = rest.strip_prefix('"') {
            let close = quoted
                .find('"')
                .ok_or_else(|| format!("unterminated quote in attribute '{}'", key))?;
            value = &quoted[..close];
            rest = &quoted[close + 1..];
        } else {
            let value_end = rest.find(';').unwrap_or(rest.len());
            value = rest[..value_end].trim_end();
            rest = &rest[value_end..];
        }

        attributes.push(key, value);
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn reader_for(content: &'static str) -> GtfReader {
        GtfReader::new(Box::new(BufReader::new(content.as_bytes())))
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(
            r#"gene_id "MSTRG.1"; transcript_id "MSTRG.1.1"; exon_number 2; locus "RLOC_00000001";"#,
        )
        .unwrap();

        assert_eq!(attrs.get("gene_id"), Some("MSTRG.1"));
        assert_eq!(attrs.get("transcript_id"), Some("MSTRG.1.1"));
        assert_eq!(attrs.get("exon_number"), Some("2"));
        assert_eq!(attrs.get("locus"), Some("RLOC_00000001"));
        assert_eq!(attrs.get("nonexistent"), None);
    }

    #[test]
    fn test_parse_attributes_quoted_semicolon() {
        let attrs = parse_attributes(r#"note "a; b"; gene_id "G1""#).unwrap();
        assert_eq!(attrs.get("note"), Some("a; b"));
        assert_eq!(attrs.get("gene_id"), Some("G1"));
    }

    #[test]
    fn test_parse_attributes_unterminated() {
        assert!(parse_attributes(r#"gene_id "G1"#).is_err());
    }

    #[test]
    fn test_parse_gtf_line() {
        let line = "chr1\tStringTie\texon\t1000\t1200\t1000\t-\t.\tgene_id \"G1\"; transcript_id \"T1\";";
        let feature = parse_gtf_line(line).unwrap();

        assert_eq!(feature.seqname, "chr1");
        assert_eq!(feature.source, "StringTie");
        assert_eq!(feature.kind, FeatureKind::Exon);
        assert_eq!(feature.start, 1000);
        assert_eq!(feature.end, 1200);
        assert_eq!(feature.score, "1000");
        assert_eq!(feature.strand, Strand::Negative);
        assert_eq!(feature.transcript_id(), Some("T1"));
    }

    #[test]
    fn test_parse_gtf_line_errors() {
        assert!(parse_gtf_line("chr1\tsrc\texon\t10").is_err());
        assert!(parse_gtf_line("chr1\tsrc\texon\tten\t20\t.\t+\t.\t").is_err());
        assert!(parse_gtf_line("chr1\tsrc\texon\t30\t20\t.\t+\t.\t").is_err());
        assert!(parse_gtf_line("chr1\tsrc\texon\t10\t20\t.\t*\t.\t").is_err());
    }

    #[test]
    fn test_reader_skips_comments_and_reports_line() {
        let mut reader = reader_for(
            "##gff-version 2\n\nchr1\tsrc\texon\t10\t20\t.\t+\t.\ttranscript_id \"T1\";\nchr1\tbroken\n",
        );

        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.start, 10);

        match reader.read_record() {
            Err(UnifyError::MalformedRecord { line, locus, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(locus, None);
            }
            other => panic!("expected malformed record, got {:?}", other),
        }

        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_keeps_its_locus() {
        let mut reader = reader_for(
            "chr1\tsrc\ttranscript\tBAD\t50\t.\t+\t.\ttranscript_id \"T2\"; locus \"RLOC_2\";\n",
        );
        let err = reader.read_record().unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.locus_id(), Some("RLOC_2"));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let content: &'static [u8] = b"chr1\tsrc\tgene\t10\t50\t.\t+\t.\tlocus \"RLOC_1\";\n\
chr1\tsrc\ttranscript\t10\t50\t.\t+\t.\tgene_name \"\xff\xfe\"; locus \"RLOC_2\";\n\
chr1\tsrc\tgene\t60\t90\t.\t+\t.\tlocus \"RLOC_3\";\n";
        let mut reader = GtfReader::new(Box::new(BufReader::new(content)));

        assert_eq!(reader.read_record().unwrap().unwrap().start, 10);
        match reader.read_record() {
            Err(UnifyError::MalformedRecord { line, message, locus }) => {
                assert_eq!(line, 2);
                assert_eq!(message, "invalid UTF-8");
                assert_eq!(locus.as_deref(), Some("RLOC_2"));
            }
            other => panic!("expected malformed record, got {:?}", other),
        }
        let third = reader.read_record().unwrap().unwrap();
        assert_eq!(third.attribute("locus"), Some("RLOC_3"));
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_scan_locus_id() {
        let line = "chr1\tsrc\texon\tx\t9\t.\t+\t.\tgene_id \"G\"; locus \"RLOC_7\";";
        assert_eq!(scan_locus_id(line, "locus"), Some("RLOC_7".to_string()));
        // `xlocus` is a different key
        assert_eq!(scan_locus_id("xlocus \"RLOC_1\";", "locus"), None);
        assert_eq!(scan_locus_id("locus RLOC_1;", "locus"), None);
        assert_eq!(scan_locus_id("cluster \"C9\";", "cluster"), Some("C9".to_string()));
    }

    #[test]
    fn test_reader_iterator() {
        let reader = reader_for(
            "chr1\tsrc\tgene\t10\t50\t.\t+\t.\tlocus \"RLOC_1\";\nchr1\tsrc\texon\t10\t20\t.\t+\t.\ttranscript_id \"T1\";\n",
        );
        let features: Vec<Feature> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].kind, FeatureKind::Gene);
    }
}
