//! `guwen serve` — run the HTTP server.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Args;
use guwen_core::config::ServerConfig;
use guwen_server::AppState;
use tracing::info;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides config and `GUWEN_BIND`).
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

pub fn run_serve(args: &ServeArgs, config: &ServerConfig) -> anyhow::Result<()> {
    let bind = args.bind.unwrap_or(config.bind);
    let state = AppState::from_config(config);
    info!(
        resources = %config.resources_dir.display(),
        music = %config.music_dir.display(),
        dictionary = %config.dictionary.base_url,
        "starting server"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("failed to bind {bind}"))?;
        guwen_server::serve(listener, state)
            .await
            .context("server stopped with an error")
    })
}
