use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Machine-readable error codes surfaced to HTTP clients and CLI users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidId,
    InvalidPathComponent,
    EmptyShard,
    DirectoryNotFound,
    NoShards,
    ShardNotFound,
    RecordNotFound,
    ResourceNotFound,
    IdOutOfRange,
    InvalidShardName,
    ShardReadFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidId => "E1001",
            Self::InvalidPathComponent => "E1002",
            Self::EmptyShard => "E1003",
            Self::DirectoryNotFound => "E2001",
            Self::NoShards => "E2002",
            Self::ShardNotFound => "E2003",
            Self::RecordNotFound => "E2004",
            Self::ResourceNotFound => "E2005",
            Self::IdOutOfRange => "E3001",
            Self::InvalidShardName => "E3002",
            Self::ShardReadFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidId => "Invalid record id",
            Self::InvalidPathComponent => "Invalid path component",
            Self::EmptyShard => "Shard layout is empty",
            Self::DirectoryNotFound => "Directory not found",
            Self::NoShards => "No shard files",
            Self::ShardNotFound => "Shard file not found",
            Self::RecordNotFound => "Record not found",
            Self::ResourceNotFound => "Resource not found",
            Self::IdOutOfRange => "Id outside shard layout",
            Self::InvalidShardName => "Invalid shard filename",
            Self::ShardReadFailed => "Shard read failed",
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidId => Some("Record ids are non-negative integers."),
            Self::InvalidPathComponent => {
                Some("Use a plain collection or subcollection name without separators.")
            }
            Self::EmptyShard => Some("The first shard must hold at least one decodable record."),
            Self::IdOutOfRange => Some(
                "Run `guwen audit` to check whether every shard holds as many records as the first.",
            ),
            Self::InvalidShardName => Some("Shard files must be named `<prefix>-<N>.jsonl`."),
            Self::ShardReadFailed => Some("Check file permissions and encoding (UTF-8)."),
            Self::DirectoryNotFound
            | Self::NoShards
            | Self::ShardNotFound
            | Self::RecordNotFound
            | Self::ResourceNotFound => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which input an [`CorpusError::InvalidArgument`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    Id,
    ShardCount,
    ObjectsPerShard,
    PathComponent,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::ShardCount => "shard count",
            Self::ObjectsPerShard => "objects per shard",
            Self::PathComponent => "path component",
        })
    }
}

/// What a [`CorpusError::NotFound`] failed to find.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Missing {
    /// Directory is absent or is not a directory.
    #[error("directory not found: {}", .0.display())]
    Directory(PathBuf),

    /// Directory exists but holds no `.jsonl` files.
    #[error("no JSONL shard files in {}", .0.display())]
    NoShards(PathBuf),

    /// The shard derived for a lookup does not exist on disk.
    #[error("shard file not found: {}", .0.display())]
    Shard(PathBuf),

    /// No decodable record in the resolved shard carries the id.
    #[error("record with id {0} not found")]
    Record(i64),

    /// Any other named resource (audio file, music directory entry).
    #[error("resource not found: {}", .0.display())]
    Resource(PathBuf),
}

/// Errors produced by corpus lookups.
///
/// Per-line decode failures are not part of this type: they are recovered
/// where the shard is read (see [`crate::jsonl`]).
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// Caller-supplied id, count, or path component violates a precondition.
    #[error("invalid {argument}: {reason}")]
    InvalidArgument { argument: Argument, reason: String },

    /// A directory, shard, record, or resource does not exist.
    #[error(transparent)]
    NotFound(#[from] Missing),

    /// The computed shard index is past the last shard.
    #[error(
        "id {id} exceeds known corpus size ({total_shards} shards of {objects_per_shard} records)"
    )]
    OutOfRange {
        id: i64,
        total_shards: usize,
        objects_per_shard: u64,
    },

    /// The shard filename carries no `-N` suffix to substitute.
    #[error("invalid shard filename format: {0}")]
    InvalidFormat(String),

    /// Any other filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CorpusError {
    pub(crate) fn invalid(argument: Argument, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error, turning `NotFound` into the given [`Missing`] kind.
    pub fn from_io(path: &Path, source: io::Error, missing: fn(PathBuf) -> Missing) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(missing(path.to_path_buf()))
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { argument, .. } => match argument {
                Argument::Id => ErrorCode::InvalidId,
                Argument::ShardCount | Argument::ObjectsPerShard => ErrorCode::EmptyShard,
                Argument::PathComponent => ErrorCode::InvalidPathComponent,
            },
            Self::NotFound(Missing::Directory(_)) => ErrorCode::DirectoryNotFound,
            Self::NotFound(Missing::NoShards(_)) => ErrorCode::NoShards,
            Self::NotFound(Missing::Shard(_)) => ErrorCode::ShardNotFound,
            Self::NotFound(Missing::Record(_)) => ErrorCode::RecordNotFound,
            Self::NotFound(Missing::Resource(_)) => ErrorCode::ResourceNotFound,
            Self::OutOfRange { .. } => ErrorCode::IdOutOfRange,
            Self::InvalidFormat(_) => ErrorCode::InvalidShardName,
            Self::Io { .. } => ErrorCode::ShardReadFailed,
        }
    }

    /// `true` for every not-found flavour, including out-of-range ids.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::OutOfRange { .. })
    }
}
