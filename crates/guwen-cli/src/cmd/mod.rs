pub mod audit;
pub mod browse;
pub mod count;
pub mod read;
pub mod serve;

use clap::Args;
use guwen_core::catalog::ResourceRoot;
use guwen_core::config::ServerConfig;

/// Addresses one corpus: `<resources>/<collection>/<subcollection>/`.
#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Collection directory name (e.g. `guwen`).
    pub collection: String,
    /// Subcollection directory name holding the shards.
    pub subcollection: String,
}

/// Resource root named by the effective configuration.
pub fn resource_root(config: &ServerConfig) -> ResourceRoot {
    ResourceRoot::new(&config.resources_dir)
}
