//! `imgfilter` binary.
//!
//! ```text
//! PORT=8082 RUST_LOG=info imgfilter
//! curl 'http://localhost:8082/filteredimage?image_url=https://example.com/cat.jpg' -o cat.jpg
//! ```

use std::sync::Arc;

use anyhow::Context;
use imgfilter::{Config, Fetcher, FilterService, Server, Transformer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,imgfilter=debug"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        port = config.port,
        scratch_dir = %config.scratch_dir.display(),
        "starting imgfilter"
    );

    let service = FilterService::new(
        Fetcher::new(config.fetch_timeout).context("failed to build http client")?,
        Transformer::new(config.scratch_dir.clone()),
    );

    let server = Server::bind(config.addr())
        .await
        .with_context(|| format!("failed to bind {}", config.addr()))?;
    info!("Server running at http://localhost:{}", config.port);
    info!("Press CTRL+C to stop server");

    server
        .serve(imgfilter::app(Arc::new(service)))
        .await
        .context("server error")
}
