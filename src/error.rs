//! Infrastructure error type.

use thiserror::Error;

/// The error type returned by the server's fallible operations.
///
/// Per-request failures (a bad `image_url`, an unreachable upstream) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type only surfaces failures that stop the server itself: binding a
/// port or reading the bound address.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
