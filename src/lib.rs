//! # imgfilter
//!
//! A small HTTP service that turns a public image URL into a 256×256
//! grayscale JPEG.
//!
//! ```text
//! GET /filteredimage?image_url=https://example.com/cat.jpg
//! ```
//!
//! The service validates `image_url`, downloads it, resizes and grayscales
//! it, writes the JPEG to a scratch file, sends that file back, and deletes
//! it. Nothing is cached or kept between requests.
//!
//! ## Routes
//!
//! | Route | Response |
//! |---|---|
//! | `GET /` | usage hint |
//! | `GET /filteredimage?image_url=…` | `image/jpeg`, or `{"message": …}` with 400 / 404 / 500 |
//! | `GET /healthz` | liveness |
//! | `GET /readyz` | readiness (scratch directory writable) |
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use imgfilter::{Config, FilterService, Fetcher, Server, Transformer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let service = FilterService::new(
//!         Fetcher::new(config.fetch_timeout)?,
//!         Transformer::new(config.scratch_dir.clone()),
//!     );
//!
//!     Server::bind(config.addr()).await?
//!         .serve(imgfilter::app(Arc::new(service)))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod error;
mod handler;
mod middleware;
mod request;
mod response;
mod router;
mod server;

pub mod cleanup;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod health;
pub mod transform;
pub mod validate;

use std::sync::Arc;

pub use config::Config;
pub use error::Error;
pub use fetch::Fetcher;
pub use filter::FilterService;
pub use handler::Handler;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, SendError};
pub use router::Router;
pub use server::Server;
pub use transform::Transformer;

/// Body of `GET /`.
pub const USAGE: &str = "Try GET /filteredimage?image_url={{URL}}";

/// The service's routes, sharing one `service` across all requests.
pub fn app(service: Arc<FilterService>) -> Router {
    let filtered = Arc::clone(&service);
    let ready = service;

    Router::new()
        .get("/", |_req: Request| async { USAGE })
        .get("/filteredimage", move |req: Request| {
            let service = Arc::clone(&filtered);
            async move { service.filtered_image(req).await }
        })
        .get("/healthz", health::liveness)
        .get("/readyz", move |_req: Request| {
            let service = Arc::clone(&ready);
            async move { health::readiness(service.transformer().scratch_dir()).await }
        })
}
