//! Record lookup by global id.
//!
//! Ids are assumed to be laid out uniformly: every shard except possibly the
//! last holds exactly as many records as the first. Under that assumption
//! the shard holding id `n` is `n / per_shard`, and its file name is derived
//! from the first shard's name, so a lookup reads only the first shard (for
//! its count) and the resolved shard.
//!
//! The assumption is not checked here. When it does not hold, a lookup may
//! land on a shard that lacks the id; that is reported as not found, never
//! as a neighbouring record.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Argument, CorpusError, Missing};
use crate::jsonl;
use crate::record::Record;
use crate::shard::{self, ShardFile};

/// 0-based index of the shard that holds `id`.
///
/// # Errors
///
/// - [`CorpusError::InvalidArgument`] if `id < 0`, `total_shards == 0`, or
///   `objects_per_shard == 0`.
/// - [`CorpusError::OutOfRange`] if the index is `>= total_shards`.
pub fn locate_shard_index(
    id: i64,
    total_shards: usize,
    objects_per_shard: u64,
) -> Result<usize, CorpusError> {
    let Ok(offset) = u64::try_from(id) else {
        return Err(CorpusError::invalid(
            Argument::Id,
            format!("must be >= 0, got {id}"),
        ));
    };
    if total_shards == 0 {
        return Err(CorpusError::invalid(Argument::ShardCount, "must be > 0"));
    }
    if objects_per_shard == 0 {
        return Err(CorpusError::invalid(Argument::ObjectsPerShard, "must be > 0"));
    }

    let out_of_range = || CorpusError::OutOfRange {
        id,
        total_shards,
        objects_per_shard,
    };
    let index = usize::try_from(offset / objects_per_shard).map_err(|_| out_of_range())?;
    if index >= total_shards {
        return Err(out_of_range());
    }
    Ok(index)
}

/// Parse a record id from a URL segment or CLI argument.
///
/// Only plain ASCII digits are accepted: no sign, whitespace, or fraction.
///
/// # Errors
///
/// Returns [`CorpusError::InvalidArgument`] for anything else, including
/// values that overflow `i64`.
pub fn parse_id(raw: &str) -> Result<i64, CorpusError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CorpusError::invalid(
            Argument::Id,
            format!("{raw:?} is not a non-negative integer"),
        ));
    }
    raw.parse()
        .map_err(|_| CorpusError::invalid(Argument::Id, format!("{raw:?} is too large")))
}

/// File name of shard `shard_index`, derived from the first shard's name.
///
/// The segment after the last `-` is replaced by `{shard_index + 1}.jsonl`;
/// ordinals on disk are 1-based.
///
/// # Errors
///
/// Returns [`CorpusError::InvalidFormat`] if the name contains no `-`.
pub fn resolve_shard_filename(
    first_shard_filename: &str,
    shard_index: usize,
) -> Result<String, CorpusError> {
    let Some((prefix, _)) = first_shard_filename.rsplit_once('-') else {
        return Err(CorpusError::InvalidFormat(first_shard_filename.to_string()));
    };
    let Some(ordinal) = shard_index.checked_add(1) else {
        return Err(CorpusError::invalid(
            Argument::ShardCount,
            format!("shard index {shard_index} overflows"),
        ));
    };
    Ok(format!("{prefix}-{ordinal}.{}", shard::SHARD_EXTENSION))
}

/// How much of the resolved shard a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Every decodable record of the resolved shard.
    WholeShard,
    /// Only the record whose id matches.
    ExactId,
}

/// Result of [`read_records_by_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Shard(Vec<Record>),
    Single(Record),
}

/// Resolve the shard for `id` and read it.
///
/// # Errors
///
/// Errors from [`locate_shard_index`] and [`resolve_shard_filename`];
/// [`Missing::Shard`] if the resolved file is absent; [`Missing::Record`]
/// in [`ReadMode::ExactId`] when no record in the shard carries `id`.
pub fn read_records_by_id(
    directory: &Path,
    first_shard_filename: &str,
    total_shards: usize,
    objects_per_first_shard: u64,
    id: i64,
    mode: ReadMode,
) -> Result<Lookup, CorpusError> {
    let index = locate_shard_index(id, total_shards, objects_per_first_shard)?;
    let target = directory.join(resolve_shard_filename(first_shard_filename, index)?);
    debug!(id, index, shard = %target.display(), "resolved shard");

    match mode {
        ReadMode::WholeShard => jsonl::read_records(&target).map(Lookup::Shard),
        ReadMode::ExactId => jsonl::find_record(&target, id)?
            .map(Lookup::Single)
            .ok_or(CorpusError::NotFound(Missing::Record(id))),
    }
}

/// Read a shard by its file stem (`book-3` for `book-3.jsonl`).
///
/// # Errors
///
/// [`CorpusError::InvalidArgument`] if `stem` is not a single path component;
/// [`Missing::Shard`] if the file does not exist.
pub fn read_shard_by_name(directory: &Path, stem: &str) -> Result<Vec<Record>, CorpusError> {
    crate::catalog::validate_component(stem)?;
    let path = directory.join(format!("{stem}.{}", shard::SHARD_EXTENSION));
    jsonl::read_records(&path)
}

/// Shard layout of one corpus directory, captured once per request.
#[derive(Debug, Clone)]
pub struct ShardLocator {
    directory: PathBuf,
    shards: Vec<ShardFile>,
    objects_per_shard: u64,
}

impl ShardLocator {
    /// Scan `directory` and count the records of its first shard.
    ///
    /// # Errors
    ///
    /// Scanner errors; [`Missing::NoShards`] when the directory holds no
    /// shard; read errors on the first shard.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let directory = directory.into();
        let shards = shard::list_shards_sorted(&directory)?;
        let Some(first) = shards.first() else {
            return Err(Missing::NoShards(directory).into());
        };
        let objects_per_shard = jsonl::count_records(&first.path)?;
        debug!(
            dir = %directory.display(),
            total_shards = shards.len(),
            objects_per_shard,
            "opened shard layout"
        );
        Ok(Self {
            directory,
            shards,
            objects_per_shard,
        })
    }

    #[must_use]
    pub fn shards(&self) -> &[ShardFile] {
        &self.shards
    }

    /// Record count of the first shard.
    #[must_use]
    pub const fn objects_per_shard(&self) -> u64 {
        self.objects_per_shard
    }

    fn first_name(&self) -> &str {
        self.shards.first().map_or("", |s| s.name.as_str())
    }

    /// Every record of the shard containing `id`.
    ///
    /// # Errors
    ///
    /// See [`read_records_by_id`].
    pub fn read_shard_containing(&self, id: i64) -> Result<Vec<Record>, CorpusError> {
        match self.lookup(id, ReadMode::WholeShard)? {
            Lookup::Shard(records) => Ok(records),
            Lookup::Single(record) => Ok(vec![record]),
        }
    }

    /// The record with exactly this id.
    ///
    /// # Errors
    ///
    /// See [`read_records_by_id`].
    pub fn read_record(&self, id: i64) -> Result<Record, CorpusError> {
        match self.lookup(id, ReadMode::ExactId)? {
            Lookup::Single(record) => Ok(record),
            Lookup::Shard(records) => records
                .into_iter()
                .find(|r| r.id == id)
                .ok_or(CorpusError::NotFound(Missing::Record(id))),
        }
    }

    fn lookup(&self, id: i64, mode: ReadMode) -> Result<Lookup, CorpusError> {
        read_records_by_id(
            &self.directory,
            self.first_name(),
            self.shards.len(),
            self.objects_per_shard,
            id,
            mode,
        )
    }
}
