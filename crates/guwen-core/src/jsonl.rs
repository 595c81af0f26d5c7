//! JSONL shard reading.
//!
//! Shards are read as raw bytes and split on `\n`; a trailing `\r` is
//! dropped. Lines are decoded independently, so one line that is not valid
//! UTF-8 or not valid JSON never aborts the read: full reads log it and skip
//! it, counts exclude it, and id lookups never match it. Blank lines are
//! ignored.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{CorpusError, Missing};
use crate::record::{DecodeError, Record};

type RawLines<'a> = std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>;

const fn is_newline(byte: &u8) -> bool {
    *byte == b'\n'
}

/// Iterator over the non-blank lines of a shard, decoded as records.
///
/// Yields `(line_number, result)` with 1-based physical line numbers.
pub struct RecordLines<'a> {
    lines: RawLines<'a>,
}

impl<'a> RecordLines<'a> {
    #[must_use]
    pub fn new(content: &'a [u8]) -> Self {
        Self {
            lines: content.split(is_newline as fn(&u8) -> bool).enumerate(),
        }
    }
}

impl Iterator for RecordLines<'_> {
    type Item = (usize, Result<Record, DecodeError>);

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.by_ref().find_map(|(idx, line)| {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.trim_ascii().is_empty() {
                None
            } else {
                Some((idx + 1, Record::decode_bytes(line)))
            }
        })
    }
}

/// Read a shard file into memory as raw bytes.
///
/// # Errors
///
/// Returns [`Missing::Shard`] if the file does not exist, or
/// [`CorpusError::Io`] on any other failure.
pub fn read_shard_bytes(path: &Path) -> Result<Vec<u8>, CorpusError> {
    fs::read(path).map_err(|e| CorpusError::from_io(path, e, Missing::Shard))
}

/// Decode every well-formed record in `content`, preserving line order.
///
/// Malformed lines are logged with `source` and skipped.
#[must_use]
pub fn decode_records(content: &[u8], source: &Path) -> Vec<Record> {
    RecordLines::new(content)
        .filter_map(|(line_no, result)| match result {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    shard = %source.display(),
                    line = line_no,
                    error = %e,
                    "skipping malformed record line"
                );
                None
            }
        })
        .collect()
}

/// Read and decode every record of a shard file.
///
/// # Errors
///
/// See [`read_shard_bytes`].
pub fn read_records(path: &Path) -> Result<Vec<Record>, CorpusError> {
    let content = read_shard_bytes(path)?;
    let records = decode_records(&content, path);
    debug!(shard = %path.display(), records = records.len(), "read shard");
    Ok(records)
}

/// Find the first record in a shard file whose id equals `id`.
///
/// # Errors
///
/// See [`read_shard_bytes`].
pub fn find_record(path: &Path, id: i64) -> Result<Option<Record>, CorpusError> {
    let content = read_shard_bytes(path)?;
    Ok(RecordLines::new(&content).find_map(|(_, result)| match result {
        Ok(record) if record.id == id => Some(record),
        _ => None,
    }))
}

/// Number of decodable records in a shard file.
///
/// # Errors
///
/// See [`read_shard_bytes`].
pub fn count_records(path: &Path) -> Result<u64, CorpusError> {
    let content = read_shard_bytes(path)?;
    let mut count = 0u64;
    for (line_no, result) in RecordLines::new(&content) {
        match result {
            Ok(_) => count += 1,
            Err(e) => warn!(
                shard = %path.display(),
                line = line_no,
                error = %e,
                "malformed record line excluded from count"
            ),
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn line(id: i64) -> String {
        format!(r#"{{"id":{id},"original":"text {id}"}}"#)
    }

    #[test]
    fn record_lines_skip_blanks_and_number_physically() {
        let content = format!("{}\n\n   \n{}\n", line(0), line(1));
        let numbers: Vec<usize> = RecordLines::new(content.as_bytes()).map(|(n, _)| n).collect();
        assert_eq!(numbers, [1, 4]);
    }

    #[test]
    fn malformed_lines_are_skipped_in_order() {
        let content = format!("{}\n{{broken\n{}\n[]\n{}\n", line(0), line(1), line(2));
        let records = decode_records(content.as_bytes(), Path::new("mem.jsonl"));
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, [0, 1, 2]);
    }

    #[test]
    fn crlf_lines_decode() {
        let content = format!("{}\r\n{}\r\n", line(7), line(8));
        let records = decode_records(content.as_bytes(), Path::new("mem.jsonl"));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn count_matches_full_read_with_malformed_lines() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("book-1.jsonl");
        let mut content = String::new();
        for id in 0..42 {
            content.push_str(&line(id));
            content.push('\n');
            if id == 5 || id == 20 || id == 33 {
                content.push_str("{\"id\": oops}\n");
            }
        }
        fs::write(&path, content).expect("write");

        assert_eq!(count_records(&path).expect("count"), 42);
        let records = read_records(&path).expect("read");
        assert_eq!(records.len(), 42);
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn find_record_ignores_malformed_lines() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("book-1.jsonl");
        fs::write(&path, format!("not json\n{}\n{}\n", line(3), line(4))).expect("write");

        let found = find_record(&path, 4).expect("find").expect("present");
        assert_eq!(found.original, "text 4");
        assert!(find_record(&path, 9).expect("find").is_none());
    }

    #[test]
    fn invalid_utf8_line_is_skipped_alone() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("book-1.jsonl");
        let mut content = line(0).into_bytes();
        content.extend_from_slice(b"\n\xff\xfe\n");
        content.extend_from_slice(line(1).as_bytes());
        content.push(b'\n');
        fs::write(&path, &content).expect("write");

        let numbers: Vec<(usize, bool)> = RecordLines::new(&content)
            .map(|(n, r)| (n, r.is_ok()))
            .collect();
        assert_eq!(numbers, [(1, true), (2, false), (3, true)]);

        let ids: Vec<i64> = read_records(&path).expect("read").iter().map(|r| r.id).collect();
        assert_eq!(ids, [0, 1]);
        assert_eq!(count_records(&path).expect("count"), 2);
        assert_eq!(find_record(&path, 1).expect("find").map(|r| r.id), Some(1));
    }

    #[test]
    fn utf8_text_survives_byte_splitting() {
        let content = "{\"id\":5,\"original\":\"關關雎鳩\"}\r\n".as_bytes();
        let records = decode_records(content, Path::new("mem.jsonl"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original, "關關雎鳩");
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let err = read_records(&tmp.path().join("book-9.jsonl")).expect_err("missing");
        assert!(matches!(err, CorpusError::NotFound(Missing::Shard(_))));
    }
}
