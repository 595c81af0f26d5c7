//! Shard directory scanning.
//!
//! A corpus directory holds numbered JSONL shards:
//!
//! ```text
//! <resources>/
//!   <collection>/
//!     prop.json            # optional display order for subcollections
//!     <subcollection>/
//!       book-1.jsonl       # ids 0..N
//!       book-2.jsonl       # ids N..2N
//!       book-3.jsonl       # ids 2N..  (may be short)
//! ```
//!
//! # Invariants
//!
//! - Shards are ordered by the integer after the last `-` of the file stem,
//!   not lexicographically (`book-10` sorts after `book-2`).
//! - A stem with no `-`, or a suffix that is not an integer, sorts as 0.
//! - Equal ordinals keep directory encounter order.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CorpusError, Missing};

/// File extension of shard files, compared case-insensitively.
pub const SHARD_EXTENSION: &str = "jsonl";

/// One shard file of a corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardFile {
    /// File name (e.g. `"book-3.jsonl"`).
    pub name: String,
    /// Ordinal printed in the file name; 0 when absent.
    pub ordinal: u64,
    /// Full path of the shard.
    pub path: PathBuf,
}

/// Ordinal of a shard file name: the integer after the last `-` of the stem.
///
/// Returns 0 when there is no `-` or the suffix is not an integer.
#[must_use]
pub fn shard_ordinal(filename: &str) -> u64 {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    stem.rsplit_once('-')
        .and_then(|(_, suffix)| suffix.parse::<u64>().ok())
        .unwrap_or(0)
}

fn has_shard_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SHARD_EXTENSION))
}

/// Sort shards by ordinal, keeping encounter order for ties.
pub fn sort_shards(shards: &mut [ShardFile]) {
    shards.sort_by_key(|s| s.ordinal);
}

/// List the shard files of `directory`, ordered by ordinal.
///
/// Only regular files (symlinks are followed) with a `.jsonl` extension in
/// any case are returned. Entries with non-UTF-8 names are skipped.
///
/// # Errors
///
/// Returns [`Missing::Directory`] if `directory` does not exist or is not a
/// directory, or [`CorpusError::Io`] if it cannot be read.
pub fn list_shards_sorted(directory: &Path) -> Result<Vec<ShardFile>, CorpusError> {
    ensure_directory(directory)?;

    let entries = fs::read_dir(directory).map_err(|e| io_error(directory, e))?;
    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_error(directory, e))?;
        let path = entry.path();
        if !has_shard_extension(&path) {
            continue;
        }
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(path = %path.display(), "skipping non-UTF-8 shard name");
            continue;
        };
        shards.push(ShardFile {
            ordinal: shard_ordinal(&name),
            name,
            path,
        });
    }

    sort_shards(&mut shards);
    debug!(dir = %directory.display(), shards = shards.len(), "listed shards");
    Ok(shards)
}

/// Fail with [`Missing::Directory`] unless `path` is an existing directory.
///
/// # Errors
///
/// See above; other metadata failures become [`CorpusError::Io`].
pub fn ensure_directory(path: &Path) -> Result<(), CorpusError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Missing::Directory(path.to_path_buf()).into()),
        Err(e) => Err(CorpusError::from_io(path, e, Missing::Directory)),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CorpusError {
    CorpusError::from_io(path, source, Missing::Directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn setup(names: &[&str]) -> TempDir {
        let tmp = TempDir::new().expect("tempdir");
        for name in names {
            fs::write(tmp.path().join(name), "{\"id\":0}\n").expect("write");
        }
        tmp
    }

    fn names(shards: &[ShardFile]) -> Vec<&str> {
        shards.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn ordinal_parsing() {
        assert_eq!(shard_ordinal("book-3.jsonl"), 3);
        assert_eq!(shard_ordinal("my-book-12.jsonl"), 12);
        assert_eq!(shard_ordinal("book.jsonl"), 0);
        assert_eq!(shard_ordinal("book-x.jsonl"), 0);
        assert_eq!(shard_ordinal("book-.jsonl"), 0);
        assert_eq!(shard_ordinal("book-7.JSONL"), 7);
    }

    #[test]
    fn numeric_not_lexicographic_order() {
        let tmp = setup(&["book-2.jsonl", "book-10.jsonl", "book-1.jsonl"]);
        let shards = list_shards_sorted(tmp.path()).expect("list");
        assert_eq!(names(&shards), ["book-1.jsonl", "book-2.jsonl", "book-10.jsonl"]);
        assert_eq!(shards[2].ordinal, 10);
        assert_eq!(shards[0].path, tmp.path().join("book-1.jsonl"));
    }

    #[test]
    fn filters_non_jsonl_and_directories() {
        let tmp = setup(&["book-1.jsonl", "book-1.mp3", "notes.txt", "BOOK-2.JSONL"]);
        fs::create_dir(tmp.path().join("dir-3.jsonl")).expect("mkdir");
        let shards = list_shards_sorted(tmp.path()).expect("list");
        assert_eq!(names(&shards), ["book-1.jsonl", "BOOK-2.JSONL"]);
    }

    #[test]
    fn unnumbered_shards_sort_first() {
        let tmp = setup(&["book-2.jsonl", "index.jsonl"]);
        let shards = list_shards_sorted(tmp.path()).expect("list");
        assert_eq!(names(&shards), ["index.jsonl", "book-2.jsonl"]);
    }

    #[test]
    fn empty_directory_lists_nothing() {
        let tmp = setup(&[]);
        assert!(list_shards_sorted(tmp.path()).expect("list").is_empty());
    }

    #[test]
    fn missing_directory_is_not_found() {
        let tmp = setup(&[]);
        let err = list_shards_sorted(&tmp.path().join("nope")).expect_err("missing");
        assert!(matches!(err, CorpusError::NotFound(Missing::Directory(_))));
    }

    #[test]
    fn file_instead_of_directory_is_not_found() {
        let tmp = setup(&["book-1.jsonl"]);
        let err = list_shards_sorted(&tmp.path().join("book-1.jsonl")).expect_err("file");
        assert!(matches!(err, CorpusError::NotFound(Missing::Directory(_))));
    }

    #[test]
    fn ties_keep_encounter_order() {
        let mut shards: Vec<ShardFile> = ["b.jsonl", "a-x.jsonl", "c-1.jsonl", "z.jsonl"]
            .iter()
            .map(|n| ShardFile {
                name: (*n).to_string(),
                ordinal: shard_ordinal(n),
                path: PathBuf::from(n),
            })
            .collect();
        sort_shards(&mut shards);
        assert_eq!(names(&shards), ["b.jsonl", "a-x.jsonl", "z.jsonl", "c-1.jsonl"]);
    }

    proptest! {
        #[test]
        fn sorted_ordinals_are_ascending(ordinals in prop::collection::vec(0u64..500, 0..40)) {
            let mut shards: Vec<ShardFile> = ordinals
                .iter()
                .map(|n| {
                    let name = format!("book-{n}.jsonl");
                    ShardFile { ordinal: shard_ordinal(&name), path: PathBuf::from(&name), name }
                })
                .collect();
            sort_shards(&mut shards);
            prop_assert!(shards.windows(2).all(|w| w[0].ordinal <= w[1].ordinal));
            prop_assert_eq!(shards.len(), ordinals.len());
        }
    }
}
