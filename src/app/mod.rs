//! Dispatcher module
//!
//! Entry point for request processing: turns a transport environment into a
//! [`Request`], asks the route table for a response, substitutes the default
//! pages when needed and hands the serialized result back to the transport.
//! Exactly one response comes out of every call.

pub mod hyper_adapter;

use std::sync::Arc;
use std::time::Instant;

use hyper::body::Bytes;

use crate::config::{Config, HttpConfig, LoggingConfig};
use crate::error::RequestError;
use crate::http::{status, Environ, Request, Response};
use crate::logger::{self, AccessLogEntry};
use crate::routing::RouteTable;

/// The receiving side of a dispatched response
pub trait Transport {
    /// Begin the response with its status line and header list
    fn start_response(&mut self, status_line: &str, headers: &[(String, String)]);

    /// Write the response body, after [`Transport::start_response`]
    fn write_body(&mut self, body: Bytes);
}

/// A route table plus the settings that govern default responses
///
/// Immutable once built, so one instance can serve concurrent requests
/// behind an `Arc`.
#[derive(Debug)]
pub struct Application {
    routes: RouteTable,
    http: HttpConfig,
    logging: LoggingConfig,
}

impl Application {
    pub fn new(routes: RouteTable) -> Self {
        Self::with_config(routes, &Config::default())
    }

    pub fn with_config(routes: RouteTable, config: &Config) -> Self {
        Self {
            routes,
            http: config.http.clone(),
            logging: config.logging.clone(),
        }
    }

    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub const fn http_config(&self) -> &HttpConfig {
        &self.http
    }

    /// Dispatch one request environment to a response
    pub fn handle(&self, environ: Environ) -> Response {
        let (response, entry) = self.dispatch(environ);
        self.log_access(entry.as_ref());
        response
    }

    /// Answer a request the transport refused before dispatch, such as one
    /// whose body could not be read
    pub fn handle_rejected(&self, environ: &Environ, err: &RequestError) -> Response {
        let (response, entry) = self.rejected(environ, err);
        self.log_access(entry.as_ref());
        response
    }

    /// Dispatch and write the result to `transport`
    pub fn call<T: Transport + ?Sized>(&self, environ: Environ, transport: &mut T) {
        write_response(self.handle(environ), transport);
    }

    /// Write the rejection for `err` to `transport`
    pub fn call_rejected<T: Transport + ?Sized>(&self, environ: &Environ, err: &RequestError, transport: &mut T) {
        write_response(self.handle_rejected(environ, err), transport);
    }

    /// Response for a request that could not be parsed
    pub fn reject(&self, err: &RequestError, method: &str, path: &str) -> Response {
        logger::log_invalid_request(method, path, &err.to_string());
        Response::error(err.status_code(self.http.invalid_request_status), err.to_string())
    }

    /// Default page for requests no route claimed
    pub fn not_found(&self) -> Response {
        Response::with_status(self.http.not_found_body.clone(), 404)
    }

    fn dispatch(&self, environ: Environ) -> (Response, Option<AccessLogEntry>) {
        let started = Instant::now();
        let mut entry = self.access_entry(&environ);
        let method = environ.method.clone();
        let path = environ.path.clone();

        let response = match Request::new(environ) {
            Ok(request) => self.route(Arc::new(request)),
            Err(err) => self.reject(&err, &method, &path),
        };
        finish_entry(entry.as_mut(), &response, started);
        (response, entry)
    }

    fn rejected(&self, environ: &Environ, err: &RequestError) -> (Response, Option<AccessLogEntry>) {
        let started = Instant::now();
        let mut entry = self.access_entry(environ);
        let response = self.reject(err, &environ.method, &environ.path);
        finish_entry(entry.as_mut(), &response, started);
        (response, entry)
    }

    fn access_entry(&self, environ: &Environ) -> Option<AccessLogEntry> {
        self.logging.access_log.then(|| {
            let mut entry = AccessLogEntry::new(environ.method.as_str(), environ.path.as_str());
            entry.query = Some(environ.query_string.clone()).filter(|q| !q.is_empty());
            entry
        })
    }

    fn log_access(&self, entry: Option<&AccessLogEntry>) {
        if let Some(entry) = entry {
            logger::log_access(entry, &self.logging.access_log_format);
        }
    }

    fn route(&self, request: Arc<Request>) -> Response {
        self.routes.respond(&request).unwrap_or_else(|| {
            logger::log_no_route(request.method(), request.path());
            self.not_found()
        })
    }
}

fn finish_entry(entry: Option<&mut AccessLogEntry>, response: &Response, started: Instant) {
    if let Some(entry) = entry {
        entry.status = status::effective_status(response.status_code());
        entry.body_bytes = response.content().len();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    }
}

fn write_response<T: Transport + ?Sized>(response: Response, transport: &mut T) {
    let wire = response.serialize();
    transport.start_response(&wire.status_line, &wire.headers);
    transport.write_body(wire.body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Args, Handler, HandlerError, HandlerResult};

    struct Heartbeat;

    impl Handler for Heartbeat {
        fn bind(_request: Arc<Request>) -> Self {
            Self
        }

        fn get(&self, _args: &Args) -> HandlerResult {
            Ok(Response::new("Alive"))
        }
    }

    struct Broken;

    impl Handler for Broken {
        fn bind(_request: Arc<Request>) -> Self {
            Self
        }

        fn get(&self, _args: &Args) -> HandlerResult {
            Err(HandlerError::new("boom"))
        }

        fn put(&self, _args: &Args) -> HandlerResult {
            Ok(Response::with_status("odd", 299))
        }
    }

    #[derive(Default)]
    struct Recorder {
        status_line: Option<String>,
        headers: Vec<(String, String)>,
        body: Vec<Bytes>,
    }

    impl Transport for Recorder {
        fn start_response(&mut self, status_line: &str, headers: &[(String, String)]) {
            assert!(self.body.is_empty(), "body written before start_response");
            self.status_line = Some(status_line.to_string());
            self.headers = headers.to_vec();
        }

        fn write_body(&mut self, body: Bytes) {
            self.body.push(body);
        }
    }

    impl Recorder {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.logging.access_log = false;
        config
    }

    fn app() -> Application {
        let routes = RouteTable::builder()
            .regex::<Heartbeat>("/heartbeat")
            .regex::<Broken>("^/broken$")
            .build()
            .unwrap();
        Application::with_config(routes, &quiet_config())
    }

    #[test]
    fn test_matched_route_forwarded() {
        let response = app().handle(Environ::new("GET", "/heartbeat"));
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content().as_ref(), b"Alive");
    }

    #[test]
    fn test_unmatched_path_is_404() {
        let response = app().handle(Environ::new("GET", "/unknown"));
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.content().as_ref(), b"<h1>Page Not Found</h1>");
    }

    #[test]
    fn test_custom_not_found_body() {
        let mut config = quiet_config();
        config.http.not_found_body = "nothing here".to_string();
        let app = Application::with_config(RouteTable::default(), &config);
        let response = app.handle(Environ::new("GET", "/"));
        assert_eq!(response.status_code(), 404);
        assert_eq!(response.content().as_ref(), b"nothing here");
    }

    #[test]
    fn test_invalid_method_is_400() {
        let response = app().handle(Environ::new("PATCH", "/heartbeat"));
        assert_eq!(response.status_code(), 400);
        let body = String::from_utf8(response.content().to_vec()).unwrap();
        assert!(body.contains("invalid request"));
    }

    #[test]
    fn test_invalid_request_status_configurable() {
        let mut config = quiet_config();
        config.http.invalid_request_status = 405;
        let app = Application::with_config(RouteTable::default(), &config);
        assert_eq!(app.handle(Environ::new("BREW", "/")).status_code(), 405);
    }

    #[test]
    fn test_handler_failure_is_500() {
        let response = app().handle(Environ::new("GET", "/broken"));
        assert_eq!(response.status_code(), 500);
        assert_eq!(response.content().as_ref(), b"boom");
    }

    #[test]
    fn test_call_writes_status_headers_then_body() {
        let mut recorder = Recorder::default();
        app().call(Environ::new("GET", "/heartbeat"), &mut recorder);

        assert_eq!(recorder.status_line.as_deref(), Some("200 OK"));
        assert_eq!(recorder.header("content-type"), Some("text/html"));
        assert_eq!(recorder.header("content-length"), Some("5"));
        assert_eq!(recorder.body, vec![Bytes::from_static(b"Alive")]);
    }

    #[test]
    fn test_call_coerces_unknown_status() {
        let mut recorder = Recorder::default();
        app().call(Environ::new("PUT", "/broken"), &mut recorder);
        assert_eq!(recorder.status_line.as_deref(), Some("500 Internal Server Error"));
        assert_eq!(recorder.body, vec![Bytes::from_static(b"odd")]);
    }

    #[test]
    fn test_call_for_unmatched_path() {
        let mut recorder = Recorder::default();
        app().call(Environ::new("GET", "/nope"), &mut recorder);
        assert_eq!(recorder.status_line.as_deref(), Some("404 Not Found"));
    }

    #[test]
    fn test_access_entry_records_dispatch() {
        let routes = RouteTable::builder().regex::<Heartbeat>("/heartbeat").build().unwrap();
        let app = Application::new(routes);

        let (response, entry) = app.dispatch(Environ::new("GET", "/heartbeat").with_query("a=1"));
        assert_eq!(response.status_code(), 200);
        let entry = entry.unwrap();
        let line = entry.format("common");
        assert!(line.ends_with("\"GET /heartbeat?a=1\" 200 5"), "{line}");
        assert_eq!(entry.format("$request_method $status $body_bytes_sent"), "GET 200 5");
    }

    #[test]
    fn test_access_entry_records_coerced_status() {
        let routes = RouteTable::builder().regex::<Broken>("^/broken$").build().unwrap();
        let app = Application::new(routes);
        let (_, entry) = app.dispatch(Environ::new("PUT", "/broken"));
        assert_eq!(entry.unwrap().status, 500);
    }

    #[test]
    fn test_access_entry_skipped_when_disabled() {
        let (response, entry) = app().dispatch(Environ::new("GET", "/nope"));
        assert_eq!(response.status_code(), 404);
        assert!(entry.is_none());
    }

    #[test]
    fn test_rejected_request_is_logged() {
        let app = Application::new(RouteTable::default());
        let environ = Environ::new("PATCH", "/upload");
        let err = RequestError::BodyTooLarge { limit: 4 };
        let (response, entry) = app.rejected(&environ, &err);
        assert_eq!(response.status_code(), 413);
        let entry = entry.unwrap();
        assert_eq!(entry.format("$request_method $request_uri $status"), "PATCH /upload 413");
    }

    #[test]
    fn test_call_rejected_writes_response() {
        let mut recorder = Recorder::default();
        let err = RequestError::Body("connection reset".to_string());
        app().call_rejected(&Environ::new("POST", "/heartbeat"), &err, &mut recorder);
        assert_eq!(recorder.status_line.as_deref(), Some("400 Bad Request"));
        assert_eq!(recorder.body.len(), 1);
    }

    #[test]
    fn test_application_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Application>();
    }
}
