//! Splits a dump into tag-delimited records.
//!
//! The reader never parses XML. It scans bytes for the start tag, then copies
//! everything up to and including the next end tag, so a malformed page can
//! only damage its own record.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_START_TAG: &str = "<page>";
pub const DEFAULT_END_TAG: &str = "</page>";

/// A tag with its KMP failure table, so partial matches that overlap the
/// next occurrence are not lost.
struct Tag {
    bytes: Vec<u8>,
    failure: Vec<usize>,
}

impl Tag {
    fn new(tag: &str) -> Self {
        let bytes = tag.as_bytes().to_vec();
        let mut failure = vec![0; bytes.len()];
        let mut k = 0;
        for i in 1..bytes.len() {
            while k > 0 && bytes[i] != bytes[k] {
                k = failure[k - 1];
            }
            if bytes[i] == bytes[k] {
                k += 1;
            }
            failure[i] = k;
        }
        Self { bytes, failure }
    }
}

pub struct RecordReader<R> {
    reader: R,
    start_tag: Tag,
    end_tag: Tag,
    record: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, start_tag: &str, end_tag: &str) -> Self {
        Self {
            reader,
            start_tag: Tag::new(start_tag),
            end_tag: Tag::new(end_tag),
            record: Vec::new(),
        }
    }

    fn next_record(&mut self) -> io::Result<Option<String>> {
        if self.start_tag.bytes.is_empty() || self.end_tag.bytes.is_empty() {
            return Ok(None);
        }
        if !scan_until(&mut self.reader, &self.start_tag, None)? {
            return Ok(None);
        }

        self.record.clear();
        self.record.extend_from_slice(&self.start_tag.bytes);
        if !scan_until(&mut self.reader, &self.end_tag, Some(&mut self.record))? {
            tracing::warn!(bytes = self.record.len(), "dump ended inside an unterminated record");
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&self.record).into_owned()))
    }
}

impl RecordReader<Box<dyn BufRead + Send>> {
    /// Open a dump file. Paths ending in `.gz` are decompressed on the fly.
    pub fn open<P: AsRef<Path>>(path: P, start_tag: &str, end_tag: &str) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn BufRead + Send> = match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Box::new(BufReader::new(MultiGzDecoder::new(file))),
            _ => Box::new(BufReader::new(file)),
        };
        Ok(Self::new(reader, start_tag, end_tag))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Consume bytes until `tag` has been read, copying them into `out` if
/// given. Returns false at end of input.
fn scan_until<R: BufRead>(reader: &mut R, tag: &Tag, mut out: Option<&mut Vec<u8>>) -> io::Result<bool> {
    let pattern = &tag.bytes;
    let mut matched = 0;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(false);
        }

        let mut consumed = 0;
        let mut found = false;
        for &byte in available {
            consumed += 1;
            if let Some(out) = out.as_mut() {
                out.push(byte);
            }
            while matched > 0 && byte != pattern[matched] {
                matched = tag.failure[matched - 1];
            }
            if byte == pattern[matched] {
                matched += 1;
                if matched == pattern.len() {
                    found = true;
                    break;
                }
            }
        }

        reader.consume(consumed);
        if found {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn records(input: &str) -> Vec<String> {
        RecordReader::new(Cursor::new(input.as_bytes().to_vec()), DEFAULT_START_TAG, DEFAULT_END_TAG)
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_split_pages() {
        let dump = "<mediawiki><siteinfo/>\n<page><id>1</id></page>\n  <page><id>2</id></page></mediawiki>";
        assert_eq!(records(dump), vec!["<page><id>1</id></page>", "<page><id>2</id></page>"]);
    }

    #[test]
    fn test_unterminated_record_is_dropped() {
        assert_eq!(records("<page><id>1</id></page><page><id>2</id>"), vec!["<page><id>1</id></page>"]);
        assert!(records("no pages here").is_empty());
    }

    #[test]
    fn test_partial_match_restarts() {
        let dump = "<<page><id>1</id><</page>";
        assert_eq!(records(dump), vec!["<page><id>1</id><</page>"]);
    }

    #[test]
    fn test_self_overlapping_tags() {
        let input = "ababac one xxxy ababac two xxy";
        let reader = BufReader::with_capacity(2, Cursor::new(input.as_bytes().to_vec()));
        let found: Vec<String> = RecordReader::new(reader, "abac", "xxy")
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(found, vec!["abac one xxxy", "abac two xxy"]);
    }

    #[test]
    fn test_failure_table() {
        assert_eq!(Tag::new("abab").failure, vec![0, 0, 1, 2]);
        assert_eq!(Tag::new("</page>").failure, vec![0; 7]);
    }

    #[test]
    fn test_custom_tags_across_small_buffers() {
        let input = "xx<doc>alpha</doc>yy<doc>beta</doc>";
        let reader = BufReader::with_capacity(3, Cursor::new(input.as_bytes().to_vec()));
        let found: Vec<String> = RecordReader::new(reader, "<doc>", "</doc>")
            .collect::<io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(found, vec!["<doc>alpha</doc>", "<doc>beta</doc>"]);
    }
}
