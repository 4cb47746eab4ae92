//! Request model
//!
//! Builds an immutable [`Request`] from the transport-facing [`Environ`]:
//! validates the method, decodes query and form parameters and keeps a
//! merged view where body values win over query values.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use hyper::body::Bytes;

use crate::error::RequestError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The HTTP methods a handler can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Trace,
}

impl Method {
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = RequestError;

    /// Method names are matched exactly, so `get` is rejected like `PATCH`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| RequestError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw request environment handed over by the transport
#[derive(Debug, Clone, Default)]
pub struct Environ {
    /// Request method as received (not yet validated)
    pub method: String,
    /// Path component of the request URI
    pub path: String,
    /// Query string without the leading `?`
    pub query_string: String,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// Fully read request body
    pub body: Bytes,
    /// Body fields the transport already decoded, such as multipart text
    /// fields; used instead of parsing `body` for POST requests
    pub form: Option<Params>,
}

impl Environ {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = query_string.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        self.content_type = content_type.map(ToString::to_string);
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_form(mut self, form: Params) -> Self {
        self.form = Some(form);
        self
    }
}

/// Multi-valued parameter map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, Vec<String>>,
}

impl Params {
    /// Decode `application/x-www-form-urlencoded` data, keeping blank values
    pub fn parse(input: &[u8]) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(input) {
            params
                .values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        params
    }

    /// First value recorded for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value recorded for `name`, in arrival order
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`; colliding names take `other`'s values
    fn overlay(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (name, values) in &other.values {
            merged.values.insert(name.clone(), values.clone());
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (key, value) in iter {
            params.values.entry(key.into()).or_default().push(value.into());
        }
        params
    }
}

/// Parsed, read-only view of one incoming request
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Params,
    form: Params,
    params: Params,
    content_type: Option<String>,
    body: Bytes,
}

impl Request {
    /// Build a request from the transport environment
    ///
    /// Fails with [`RequestError::InvalidMethod`] when the method is not one
    /// of the seven supported names.
    pub fn new(environ: Environ) -> Result<Self, RequestError> {
        let method: Method = environ.method.parse()?;

        let query = if environ.query_string.is_empty() {
            Params::default()
        } else {
            Params::parse(environ.query_string.as_bytes())
        };

        let form = match (method, environ.form) {
            (Method::Post, Some(decoded)) => decoded,
            (Method::Post, None) if is_form_body(environ.content_type.as_deref()) => Params::parse(&environ.body),
            _ => Params::default(),
        };

        let params = query.overlay(&form);

        Ok(Self {
            method,
            path: environ.path,
            query,
            form,
            params,
            content_type: environ.content_type,
            body: environ.body,
        })
    }

    pub const fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string parameters
    pub const fn query(&self) -> &Params {
        &self.query
    }

    /// Body parameters, populated only for form POST requests
    pub const fn form(&self) -> &Params {
        &self.form
    }

    /// Query and body parameters merged, body values winning on collision
    pub const fn params(&self) -> &Params {
        &self.params
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw request body
    pub const fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Form bodies are those without a content type or declared as url-encoded
fn is_form_body(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |value| {
        value
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    })
}
