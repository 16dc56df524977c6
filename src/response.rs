//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in a handler and return it. The server turns it into
//! a hyper response with a fully buffered body.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http_body_util::Full;
use serde::Serialize;
use thiserror::Error;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values this service sends.
pub enum ContentType {
    Jpeg,        // image/jpeg
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg        => "image/jpeg",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }

    /// Picks a content type from a file extension, falling back to
    /// `application/octet-stream`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
                Self::Jpeg
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Self::Text,
            _ => Self::OctetStream,
        }
    }
}

// ── SendError ─────────────────────────────────────────────────────────────────

/// A file could not be turned into a response body.
#[derive(Debug, Error)]
#[error("failed to send {path}: {source}")]
pub struct SendError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use imgfilter::Response;
/// use http::StatusCode;
///
/// Response::text("hello");
/// Response::status(StatusCode::NO_CONTENT);
/// Response::builder()
///     .status(StatusCode::BAD_REQUEST)
///     .json(br#"{"message":"nope"}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Bytes,
    pub(crate) headers: Vec<(HeaderName, HeaderValue)>,
    pub(crate) status: StatusCode,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { body: Bytes::new(), headers: Vec::new(), status: code }
    }

    /// `{"message": …}` JSON body with the given status.
    pub fn message(code: StatusCode, message: &str) -> Self {
        #[derive(Serialize)]
        struct Message<'a> {
            message: &'a str,
        }

        match serde_json::to_vec(&Message { message }) {
            Ok(body) => Self::builder().status(code).json(body),
            Err(_) => Self::status(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// `200 OK` with the contents of the file at `path` as the body.
    ///
    /// The whole file is read before the response is returned, so the file
    /// may be removed as soon as this resolves.
    pub async fn file(path: &Path) -> Result<Self, SendError> {
        let body = tokio::fs::read(path).await.map_err(|source| SendError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::builder().bytes(ContentType::from_path(path), body))
    }

    /// Builder for responses that need a custom status.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            headers.append(name, value);
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(ContentType::Json, body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text, Bytes::from(body.into()))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type, body.into())
    }

    fn finish(self, content_type: ContentType, body: Bytes) -> Response {
        let headers = vec![(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()))];
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a bare status from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(res: &http::Response<Full<Bytes>>) -> &str {
        res.headers()[CONTENT_TYPE].to_str().unwrap()
    }

    #[test]
    fn message_is_json_object() {
        let res = Response::message(StatusCode::NOT_FOUND, "Image not found");
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), br#"{"message":"Image not found"}"#);
        assert_eq!(content_type(&res.into_inner()), "application/json");
    }

    #[test]
    fn builder_sets_status_and_one_content_type() {
        let res = Response::builder()
            .status(StatusCode::CREATED)
            .text("made")
            .into_inner();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(content_type(&res), "text/plain; charset=utf-8");
        assert_eq!(res.headers().len(), 1);
        assert!(Response::status(StatusCode::NO_CONTENT).into_inner().headers().is_empty());
    }

    #[test]
    fn content_type_from_extension() {
        assert!(matches!(ContentType::from_path(Path::new("/tmp/a.JPG")), ContentType::Jpeg));
        assert!(matches!(ContentType::from_path(Path::new("/tmp/a")), ContentType::OctetStream));
    }

    #[tokio::test]
    async fn file_reads_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let res = Response::file(&path).await.unwrap();
        assert_eq!(res.body(), b"jpegbytes");
        assert_eq!(content_type(&res.into_inner()), "image/jpeg");
    }

    #[tokio::test]
    async fn file_missing_is_send_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.jpg");

        let err = Response::file(&path).await.err().unwrap();
        assert_eq!(err.path, path);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }
}
