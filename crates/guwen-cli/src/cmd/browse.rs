//! Directory listings: `guwen collections`, `guwen subcollections`,
//! `guwen shards`.

use std::io::Write;

use clap::Args;
use guwen_core::config::ServerConfig;
use serde::Serialize;

use super::{CorpusArgs, resource_root};
use crate::output::{OutputMode, pretty_section, render_mode, render_names, report};

#[derive(Args, Debug)]
pub struct CollectionArgs {
    /// Collection directory name.
    pub collection: String,
}

/// One shard as listed by `guwen shards`.
#[derive(Debug, Serialize)]
pub struct ShardRow {
    pub name: String,
    pub ordinal: u64,
}

pub fn run_collections(config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let names = resource_root(config)
        .list_collections()
        .map_err(|e| report(output, e))?;
    render_names(output, "collections", &names)
}

pub fn run_subcollections(
    args: &CollectionArgs,
    config: &ServerConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let names = resource_root(config)
        .list_subcollections(&args.collection)
        .map_err(|e| report(output, e))?;
    render_names(output, &args.collection, &names)
}

pub fn run_shards(args: &CorpusArgs, config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let shards = resource_root(config)
        .list_shards(&args.collection, &args.subcollection)
        .map_err(|e| report(output, e))?;
    let rows: Vec<ShardRow> = shards
        .into_iter()
        .map(|s| ShardRow {
            name: s.name,
            ordinal: s.ordinal,
        })
        .collect();

    render_mode(
        output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}", row.name)?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("shards ({})", rows.len()))?;
            for row in rows {
                writeln!(w, "  {:>4}  {}", row.ordinal, row.name)?;
            }
            Ok(())
        },
    )
}
