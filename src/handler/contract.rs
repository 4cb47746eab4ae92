//! The `Handler` trait and its failure type

use std::sync::Arc;

use thiserror::Error;

use super::Args;
use crate::http::{Method, Request, Response};

/// Outcome of a handler operation
pub type HandlerResult = Result<Response, HandlerError>;

/// Failure raised by a handler operation
///
/// The router turns any of these into a 500 response whose body is the
/// error message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),

    #[error("missing capture at position {0}")]
    MissingCapture(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::Failed(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::Failed(message.to_string())
    }
}

/// A route target, instantiated fresh for every matched request
///
/// Implementors override the operations they support; every other method
/// answers 405 Method Not Allowed.
///
/// ```
/// use std::sync::Arc;
/// use mnml::handler::{Args, Handler, HandlerResult};
/// use mnml::http::{Request, Response};
///
/// struct Heartbeat;
///
/// impl Handler for Heartbeat {
///     fn bind(_request: Arc<Request>) -> Self {
///         Self
///     }
///
///     fn get(&self, _args: &Args) -> HandlerResult {
///         Ok(Response::new("Alive"))
///     }
/// }
/// ```
pub trait Handler {
    /// Create the handler for one request
    fn bind(request: Arc<Request>) -> Self
    where
        Self: Sized;

    fn get(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn post(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn put(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn delete(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn head(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn options(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    fn trace(&self, _args: &Args) -> HandlerResult {
        Ok(self.error(405, ""))
    }

    /// Build a response with `code` and `message` as body
    fn error(&self, code: u16, message: &str) -> Response {
        Response::error(code, message)
    }

    /// Run the operation matching `method`
    fn dispatch(&self, method: Method, args: &Args) -> HandlerResult {
        match method {
            Method::Get => self.get(args),
            Method::Post => self.post(args),
            Method::Put => self.put(args),
            Method::Delete => self.delete(args),
            Method::Head => self.head(args),
            Method::Options => self.options(args),
            Method::Trace => self.trace(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Environ;

    struct GetOnly {
        request: Arc<Request>,
    }

    impl Handler for GetOnly {
        fn bind(request: Arc<Request>) -> Self {
            Self { request }
        }

        fn get(&self, args: &Args) -> HandlerResult {
            let name = args.require(0)?;
            Ok(Response::new(format!("{} {name}", self.request.path())))
        }
    }

    fn bound(method: &str) -> GetOnly {
        let request = Request::new(Environ::new(method, "/hello")).unwrap();
        GetOnly::bind(Arc::new(request))
    }

    #[test]
    fn test_overridden_operation() {
        let handler = bound("GET");
        let response = handler.dispatch(Method::Get, &Args::positional(["bob"])).unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content().as_ref(), b"/hello bob");
    }

    #[test]
    fn test_default_operations_are_405() {
        let handler = bound("GET");
        for method in Method::ALL.into_iter().filter(|m| *m != Method::Get) {
            let response = handler.dispatch(method, &Args::default()).unwrap();
            assert_eq!(response.status_code(), 405, "{method}");
            assert!(response.content().is_empty());
        }
    }

    #[test]
    fn test_missing_capture_is_an_error() {
        let handler = bound("GET");
        let err = handler.dispatch(Method::Get, &Args::default()).unwrap_err();
        assert_eq!(err.to_string(), "missing capture at position 0");
    }

    #[test]
    fn test_error_helper() {
        let handler = bound("GET");
        let response = handler.error(503, "down");
        assert_eq!(response.status_code(), 503);
        assert_eq!(response.content().as_ref(), b"down");
    }

    #[test]
    fn test_handler_error_conversions() {
        assert_eq!(HandlerError::from("boom").to_string(), "boom");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "pipe closed");
        assert_eq!(HandlerError::from(io).to_string(), "pipe closed");
    }
}
