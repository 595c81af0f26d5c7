//! `guwen page` and `guwen get` — read records by global id.

use clap::Args;
use guwen_core::config::{ReadingPreferences, ServerConfig};
use guwen_core::{CorpusError, ShardLocator, parse_id};
use tracing::debug;

use super::{CorpusArgs, resource_root};
use crate::output::{OutputMode, pretty_record, render_mode, report, text_record};

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Global record id (0-based).
    pub id: String,

    /// Show the English translation.
    #[arg(long)]
    pub en: bool,

    /// Show the Japanese translation.
    #[arg(long)]
    pub jp: bool,
}

impl RecordArgs {
    pub fn preferences(&self) -> ReadingPreferences {
        ReadingPreferences {
            show_translation_en: self.en,
            show_translation_jp: self.jp,
            ..ReadingPreferences::default()
        }
    }

    fn locator(&self, config: &ServerConfig) -> Result<(ShardLocator, i64), CorpusError> {
        let id = parse_id(&self.id)?;
        let dir = resource_root(config).corpus_dir(&self.corpus.collection, &self.corpus.subcollection)?;
        Ok((ShardLocator::open(dir)?, id))
    }
}

/// Every record of the shard holding the id.
pub fn run_page(args: &RecordArgs, config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let records = args
        .locator(config)
        .and_then(|(locator, id)| locator.read_shard_containing(id))
        .map_err(|e| report(output, e))?;
    debug!(records = records.len(), "read shard page");

    let prefs = args.preferences();
    render_mode(
        output,
        &records,
        |records, w| {
            for record in records {
                text_record(w, record, prefs)?;
            }
            Ok(())
        },
        |records, w| {
            for record in records {
                pretty_record(w, record, prefs)?;
            }
            Ok(())
        },
    )
}

/// The record with exactly the id.
pub fn run_get(args: &RecordArgs, config: &ServerConfig, output: OutputMode) -> anyhow::Result<()> {
    let record = args
        .locator(config)
        .and_then(|(locator, id)| locator.read_record(id))
        .map_err(|e| report(output, e))?;

    let prefs = args.preferences();
    render_mode(
        output,
        &record,
        |record, w| text_record(w, record, prefs),
        |record, w| pretty_record(w, record, prefs),
    )
}
