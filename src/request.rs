//! Incoming HTTP request type.

use std::collections::HashMap;

use http::{HeaderMap, Method};

/// An incoming HTTP request, as seen by a handler.
///
/// Only the request head is kept. Every route this service exposes is a
/// `GET`, so the body is never read.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, params: HashMap<String, String>) -> Self {
        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            query,
            params,
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Returns a named path parameter.
    ///
    /// For a route `/images/{id}`, `req.param("id")` on `/images/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the first percent-decoded query parameter named `key`.
    ///
    /// `?image_url=` yields `Some("")`; a missing key yields `None`.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request {
        let (parts, ()) = http::Request::get(uri).body(()).unwrap().into_parts();
        Request::new(parts, HashMap::new())
    }

    #[test]
    fn query_is_percent_decoded() {
        let req = request("/filteredimage?image_url=https%3A%2F%2Fexample.com%2Fcat.jpg");
        assert_eq!(req.query("image_url"), Some("https://example.com/cat.jpg"));
        assert_eq!(req.path(), "/filteredimage");
    }

    #[test]
    fn empty_and_missing_query_values() {
        let req = request("/filteredimage?image_url=");
        assert_eq!(req.query("image_url"), Some(""));
        assert_eq!(request("/filteredimage").query("image_url"), None);
    }

    #[test]
    fn head_and_path_params() {
        let (parts, ()) = http::Request::get("/images/42")
            .header("x-request-id", "abc")
            .body(())
            .unwrap()
            .into_parts();
        let params = HashMap::from([("id".to_owned(), "42".to_owned())]);
        let req = Request::new(parts, params);

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.headers()["x-request-id"], "abc");
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("name"), None);
    }

    #[test]
    fn first_repeated_key_wins() {
        let req = request("/filteredimage?image_url=a&image_url=b");
        assert_eq!(req.query("image_url"), Some("a"));
    }
}
