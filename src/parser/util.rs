//! Utility functions for file parsing.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a file as a buffered reader, decompressing gzip transparently.
///
/// A file is treated as gzip when its name ends with ".gz" or its first two
/// bytes are the gzip magic number, so bgzipped annotations are read too.
pub fn open_buffered(path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
    let mut reader = BufReader::new(File::open(path)?);
    let gzipped = path.to_string_lossy().ends_with(".gz")
        || reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    if gzipped {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Read, Write};

    #[test]
    fn test_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.gtf");
        std::fs::write(&path, "line1\nline2\n").unwrap();

        let reader = open_buffered(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line1", "line2"]);
    }

    #[test]
    fn test_gzip_detected_by_magic() {
        let dir = tempfile::tempdir().unwrap();
        // No .gz suffix on purpose
        let path = dir.path().join("compressed.gtf");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"chr1\tgz\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let reader = open_buffered(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["chr1\tgz"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(open_buffered(Path::new("/nonexistent/input.gtf")).is_err());
    }

    #[test]
    fn test_short_and_empty_files_are_plain() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.gtf");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(open_buffered(&empty).unwrap().lines().count(), 0);

        let short = dir.path().join("short.gtf");
        std::fs::write(&short, [0x1f]).unwrap();
        let mut bytes = Vec::new();
        open_buffered(&short).unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0x1f]);
    }
}
