//! guwen-server: axum routes over [`guwen_core`].
//!
//! Every request is independent. Handlers validate path parameters, then
//! move the filesystem or dictionary work to the blocking pool; nothing is
//! cached between requests.

pub mod dictionary;
pub mod error;
pub mod routes;

pub use error::ServerError;
pub use routes::{AppState, router};

use tokio::net::TcpListener;
use tracing::info;

/// Serve `state` on `listener` until Ctrl-C.
///
/// # Errors
///
/// Returns the listener's I/O error if the server stops abnormally.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(address = %addr, root = %state.resources.root().display(), "guwen listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
