//! `guwen count` — estimated number of records in a corpus.

use std::io::Write;

use guwen_core::config::ServerConfig;
use serde::Serialize;

use super::{CorpusArgs, resource_root};
use crate::output::{OutputMode, pretty_kv, render_mode, report};

#[derive(Debug, Serialize)]
pub struct CountReport {
    pub collection: String,
    pub subcollection: String,
    pub count: u64,
}

pub fn run_count(args: &CorpusArgs, config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let root = resource_root(config);
    let count = root
        .corpus_dir(&args.collection, &args.subcollection)
        .and_then(|dir| guwen_core::estimate_total_count(&dir))
        .map_err(|e| report(output, e))?;

    let value = CountReport {
        collection: args.collection.clone(),
        subcollection: args.subcollection.clone(),
        count,
    };
    render_mode(
        output,
        &value,
        |v, w| writeln!(w, "{}", v.count),
        |v, w| {
            pretty_kv(w, "corpus", format!("{}/{}", v.collection, v.subcollection))?;
            pretty_kv(w, "count", v.count.to_string())
        },
    )
}
