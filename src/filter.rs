//! The `/filteredimage` pipeline.
//!
//! ```text
//! Received ─validate─▶ Validated ─fetch─▶ Fetched ─transform─▶ Transformed ─send─▶ Sent ─cleanup─▶ CleanedUp
//!     │                    │                  │                                      (send may fail;
//!     └──── 400 ───────────┴────── 404 ───────┘                                       cleanup still runs)
//! ```
//!
//! Fetch and transform failures are reported to the caller as a bare
//! `Image not found`; the cause only goes to the log.

use http::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cleanup::ScratchFile;
use crate::fetch::{FetchError, Fetcher};
use crate::request::Request;
use crate::response::{IntoResponse, Response, SendError};
use crate::transform::{TransformError, Transformer};
use crate::validate::{self, ValidationError};

/// Query parameter carrying the source image URL.
pub const IMAGE_URL_PARAM: &str = "image_url";

pub const MALFORMED_MESSAGE: &str = "image_url is required or malformed";
pub const UNSUPPORTED_MESSAGE: &str = "Image type not supported";
pub const NOT_FOUND_MESSAGE: &str = "Image not found";
pub const SEND_FAILED_MESSAGE: &str = "Error sending the file";

/// Why a `/filteredimage` request did not produce an image.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(ValidationError::UnsupportedType) => {
                Response::message(StatusCode::BAD_REQUEST, UNSUPPORTED_MESSAGE)
            }
            Self::Validation(_) => Response::message(StatusCode::BAD_REQUEST, MALFORMED_MESSAGE),
            Self::Fetch(_) | Self::Transform(_) => {
                Response::message(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
            }
            Self::Send(_) => {
                Response::message(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED_MESSAGE)
            }
        }
    }
}

/// Shared, read-only state behind the `/filteredimage` route.
#[derive(Clone, Debug)]
pub struct FilterService {
    fetcher: Fetcher,
    transformer: Transformer,
}

impl FilterService {
    pub fn new(fetcher: Fetcher, transformer: Transformer) -> Self {
        Self { fetcher, transformer }
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// `GET /filteredimage?image_url=<url>`
    pub async fn filtered_image(&self, req: Request) -> Response {
        let result = match self.prepare(req.query(IMAGE_URL_PARAM)).await {
            Ok(file) => send(file).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            match e {
                FilterError::Validation(v) => debug!(reason = %v, "rejected image_url"),
                other => warn!(error = %other, "filtered image request failed"),
            }
        }
        result.into_response()
    }

    /// Validate, fetch, and transform. Nothing is left on disk on error.
    async fn prepare(&self, image_url: Option<&str>) -> Result<ScratchFile, FilterError> {
        let url = validate::validate(image_url)?;
        let bytes = self.fetcher.fetch(&url).await?;
        Ok(self.transformer.transform(bytes).await?)
    }
}

/// Reads the scratch file into the response, then removes it whatever the
/// outcome of the read.
async fn send(file: ScratchFile) -> Result<Response, FilterError> {
    let sent = Response::file(file.path()).await;
    file.remove().await;
    Ok(sent?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn status_and_body(err: FilterError) -> (StatusCode, String) {
        let res = err.into_response();
        (res.status_code(), String::from_utf8(res.body().to_vec()).unwrap())
    }

    #[test]
    fn validation_errors_are_400() {
        for (err, message) in [
            (ValidationError::MissingInput, MALFORMED_MESSAGE),
            (ValidationError::MalformedUrl, MALFORMED_MESSAGE),
            (ValidationError::UnsupportedType, UNSUPPORTED_MESSAGE),
        ] {
            let (status, body) = status_and_body(err.into());
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, format!(r#"{{"message":"{message}"}}"#));
        }
    }

    #[test]
    fn upstream_errors_hide_their_cause() {
        let err = FetchError::Status { url: "https://example.com/cat.jpg".into(), status: 503 };
        let (status, body) = status_and_body(err.into());
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"Image not found"}"#);
    }

    #[test]
    fn send_errors_are_500() {
        let err = SendError {
            path: PathBuf::from("/tmp/filtered_gone.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let (status, body) = status_and_body(err.into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"message":"Error sending the file"}"#);
    }

    #[tokio::test]
    async fn send_removes_file_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_1.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let res = send(ScratchFile::new(path.clone())).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"jpeg");
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn send_failure_still_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        // Reading a dangling symlink fails; removing it succeeds.
        let path = dir.path().join("filtered_dangling.jpg");
        std::os::unix::fs::symlink(dir.path().join("nowhere.jpg"), &path).unwrap();

        let err = send(ScratchFile::new(path.clone())).await.unwrap_err();
        assert!(matches!(err, FilterError::Send(_)));
        assert!(path.symlink_metadata().is_err());
    }
}
