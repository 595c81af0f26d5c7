//! Corpus size estimation.
//!
//! [`estimate_total_count`] reads at most two shards: the first and the last.
//! With `n > 1` shards it returns `first * (n - 1) + last`. The result is
//! exact only when every non-final shard holds as many records as the first;
//! middle shards are never opened, so a short or long middle shard makes the
//! estimate wrong without any error. [`audit_uniformity`] reads every shard
//! and reports where that assumption fails.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::CorpusError;
use crate::jsonl;
use crate::shard;

/// Estimated number of records in a corpus directory.
///
/// - no shards: 0
/// - one shard: its exact decodable record count
/// - otherwise: `first * (shards - 1) + last`
///
/// # Errors
///
/// Propagates scanner errors (missing directory) and shard read errors.
pub fn estimate_total_count(directory: &Path) -> Result<u64, CorpusError> {
    let shards = shard::list_shards_sorted(directory)?;
    let (first, last) = match shards.as_slice() {
        [] => return Ok(0),
        [only] => return jsonl::count_records(&only.path),
        [first, .., last] => (first, last),
    };

    let first_count = jsonl::count_records(&first.path)?;
    let last_count = jsonl::count_records(&last.path)?;
    let full_shards = (shards.len() - 1) as u64;
    let total = first_count
        .saturating_mul(full_shards)
        .saturating_add(last_count);
    debug!(
        dir = %directory.display(),
        shards = shards.len(),
        first_count,
        last_count,
        total,
        "estimated corpus size"
    );
    Ok(total)
}

/// Record count of one shard, as seen by the audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardCount {
    pub name: String,
    pub count: u64,
}

/// Result of [`audit_uniformity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniformityReport {
    pub shards: Vec<ShardCount>,
    /// What [`estimate_total_count`] returns for this directory.
    pub estimated: u64,
    /// Sum of every shard's count.
    pub exact: u64,
    /// Non-final shards whose count differs from the first shard's.
    pub irregular: Vec<String>,
}

impl UniformityReport {
    /// `true` when every non-final shard matches the first.
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.irregular.is_empty()
    }
}

/// Count every shard and compare the layout against the uniform assumption.
///
/// This is a diagnostic; lookups and [`estimate_total_count`] never call it.
///
/// # Errors
///
/// Propagates scanner and shard read errors.
pub fn audit_uniformity(directory: &Path) -> Result<UniformityReport, CorpusError> {
    let shards = shard::list_shards_sorted(directory)?;
    let mut counts = Vec::with_capacity(shards.len());
    for shard in &shards {
        counts.push(ShardCount {
            name: shard.name.clone(),
            count: jsonl::count_records(&shard.path)?,
        });
    }

    let exact = counts.iter().map(|c| c.count).sum();
    let estimated = match counts.as_slice() {
        [] => 0,
        [only] => only.count,
        [first, .., last] => first
            .count
            .saturating_mul((counts.len() - 1) as u64)
            .saturating_add(last.count),
    };
    let irregular = match counts.split_last() {
        Some((_, body)) => {
            let expected = body.first().map_or(0, |c| c.count);
            body.iter()
                .filter(|c| c.count != expected)
                .map(|c| c.name.clone())
                .collect()
        }
        None => Vec::new(),
    };

    Ok(UniformityReport {
        shards: counts,
        estimated,
        exact,
        irregular,
    })
}
