//! `guwen audit` — count every shard and compare against the layout that
//! id lookups and the count estimate assume.
//!
//! Exits non-zero when a non-final shard differs from the first.

use std::io::Write;

use guwen_core::config::ServerConfig;

use super::{CorpusArgs, resource_root};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode, report};

pub fn run_audit(args: &CorpusArgs, config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let report_data = resource_root(config)
        .corpus_dir(&args.collection, &args.subcollection)
        .and_then(|dir| guwen_core::count::audit_uniformity(&dir))
        .map_err(|e| report(output, e))?;

    render_mode(
        output,
        &report_data,
        |r, w| {
            for shard in &r.shards {
                let mark = if r.irregular.contains(&shard.name) { "!" } else { "" };
                writeln!(w, "{}\t{}{mark}", shard.name, shard.count)?;
            }
            writeln!(w, "estimated\t{}", r.estimated)?;
            writeln!(w, "exact\t{}", r.exact)
        },
        |r, w| {
            pretty_section(w, &format!("{}/{}", args.collection, args.subcollection))?;
            for shard in &r.shards {
                let note = if r.irregular.contains(&shard.name) {
                    "  (differs from first shard)"
                } else {
                    ""
                };
                writeln!(w, "  {:<24} {:>8}{note}", shard.name, shard.count)?;
            }
            writeln!(w)?;
            pretty_kv(w, "estimated", r.estimated.to_string())?;
            pretty_kv(w, "exact", r.exact.to_string())?;
            pretty_kv(w, "uniform", if r.is_uniform() { "yes" } else { "no" })
        },
    )?;

    if !report_data.is_uniform() {
        render_error(
            output,
            &CliError::new(format!(
                "{} shard(s) differ from the first; id lookups may miss records",
                report_data.irregular.len()
            )),
        )?;
        anyhow::bail!("shard layout is not uniform");
    }
    Ok(())
}
