//! guwen-core library.
//!
//! Read-only access to classical-text corpora stored as numbered JSONL
//! shards: shard scanning, id-to-shard resolution, record decoding, and
//! corpus size estimation.
//!
//! # Conventions
//!
//! - **Errors**: [`error::CorpusError`] for lookups; `anyhow::Result` for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod catalog;
pub mod config;
pub mod count;
pub mod error;
pub mod jsonl;
pub mod locate;
pub mod record;
pub mod shard;

pub use count::estimate_total_count;
pub use error::{CorpusError, ErrorCode, Missing};
pub use locate::{ShardLocator, locate_shard_index, parse_id, resolve_shard_filename};
pub use record::{Annotation, Record};
pub use shard::{ShardFile, list_shards_sorted};
