//! Response model
//!
//! A [`Response`] owns its status, a fresh lowercase-keyed header map and
//! the body bytes. `content-length` is fixed when the response is built and
//! the status is only validated when the response is serialized.

use std::collections::HashMap;

use hyper::body::Bytes;

use crate::http::status;

/// Content type applied when a handler never sets one
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

const CONTENT_TYPE: &str = "content-type";
const CONTENT_LENGTH: &str = "content-length";
const LOCATION: &str = "location";

/// An HTTP response under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

/// The wire form of a response, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedResponse {
    /// Status code actually sent (unknown codes already coerced to 500)
    pub status: u16,
    /// `<code> <reason phrase>`
    pub status_line: String,
    /// Header name/value pairs in no particular order
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    /// Build a 200 response with the given content
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self::from_parts(content, std::iter::empty::<(&str, &str)>(), 200)
    }

    /// Build a response with an explicit status
    pub fn with_status(content: impl Into<Bytes>, status: u16) -> Self {
        Self::from_parts(content, std::iter::empty::<(&str, &str)>(), status)
    }

    /// Build a response from content, initial headers and a status
    ///
    /// `content-length` always reflects `content`, overriding any supplied
    /// value. `content-type` defaults to [`DEFAULT_CONTENT_TYPE`].
    pub fn from_parts<I, K, V>(content: impl Into<Bytes>, headers: I, status: u16) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let body = content.into();
        let mut response = Self {
            status,
            headers: HashMap::new(),
            body,
        };
        response.set_headers(headers);
        response
            .headers
            .insert(CONTENT_LENGTH.to_string(), response.body.len().to_string());
        response
            .headers
            .entry(CONTENT_TYPE.to_string())
            .or_insert_with(|| DEFAULT_CONTENT_TYPE.to_string());
        response
    }

    /// Build an error response carrying `message` as its body
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::with_status(message.into(), status)
    }

    /// Build a body-less redirect to `location`
    ///
    /// Permanent redirects use 301, temporary ones 302.
    pub fn redirect(location: impl Into<String>, permanent: bool) -> Self {
        let status = if permanent { 301 } else { 302 };
        let mut response = Self::with_status(Bytes::new(), status);
        response.set_header(LOCATION, location);
        response
    }

    /// Status code as set, which may not be a recognized code
    pub const fn status_code(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Look up a header, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.set_header(name.as_ref(), value);
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub const fn content(&self) -> &Bytes {
        &self.body
    }

    /// Replace the body
    ///
    /// `content-length` keeps the value computed at construction; callers
    /// replacing the body must fix that header themselves.
    pub fn set_content(&mut self, content: impl Into<Bytes>) {
        self.body = content.into();
    }

    /// Produce the wire form without mutating the response
    pub fn serialize(&self) -> SerializedResponse {
        let effective = status::effective_status(self.status);
        if effective != self.status {
            crate::logger::log_status_coerced(self.status);
        }

        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if !self.headers.contains_key(CONTENT_TYPE) {
            headers.push((CONTENT_TYPE.to_string(), DEFAULT_CONTENT_TYPE.to_string()));
        }

        SerializedResponse {
            status: effective,
            status_line: status::status_line(effective),
            headers,
            body: self.body.clone(),
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(Bytes::new())
    }
}
