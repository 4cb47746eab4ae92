//! hyper transport adapter
//!
//! Plugs an [`Application`] into a hyper connection:
//!
//! ```ignore
//! let app = Arc::new(app);
//! builder.serve_connection(io, service_fn(move |req| hyper_adapter::serve(Arc::clone(&app), req)));
//! ```
//!
//! The method is checked before the body is touched. The body is then read
//! up front (bounded by `http.max_body_size`), multipart form fields are
//! decoded, and dispatch runs on the blocking pool, since handlers are
//! synchronous and may wait on slow external work.

use std::convert::Infallible;
use std::sync::Arc;

use futures_util::stream;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};

use super::{Application, Transport};
use crate::error::RequestError;
use crate::http::{Environ, Method, Params};
use crate::logger;

const MULTIPART_FORM: &str = "multipart/form-data";

/// Collects the dispatcher's output into a hyper response
#[derive(Debug, Default)]
struct HyperTransport {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Transport for HyperTransport {
    fn start_response(&mut self, status_line: &str, headers: &[(String, String)]) {
        self.status = status_line
            .split_once(' ')
            .map_or(status_line, |(code, _)| code)
            .parse()
            .unwrap_or(500);
        self.headers = headers.to_vec();
    }

    fn write_body(&mut self, body: Bytes) {
        self.body = body;
    }
}

impl HyperTransport {
    fn into_response(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build {} response: {e}", self.status));
            internal_error()
        })
    }
}

/// Serve one hyper request through `app`
///
/// Never fails: every outcome, including body read errors and a crashed
/// dispatch task, becomes a response.
pub async fn serve<B>(app: Arc<Application>, req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let environ = Environ::new(parts.method.as_str(), parts.uri.path())
        .with_query(parts.uri.query().unwrap_or_default());

    let method = match environ.method.parse::<Method>() {
        Ok(method) => method,
        Err(err) => return Ok(reject(&app, &environ, &err)),
    };

    let limit = app.http_config().max_body_size;
    let body = match read_body(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) => return Ok(reject(&app, &environ, &err)),
    };
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let mut environ = environ.with_body(content_type, body);

    if let Some(content_type) = content_type.filter(|ct| method == Method::Post && is_multipart(ct)) {
        match read_multipart(content_type, environ.body.clone()).await {
            Ok(form) => environ = environ.with_form(form),
            Err(err) => return Ok(reject(&app, &environ, &err)),
        }
    }

    let dispatched = tokio::task::spawn_blocking(move || {
        let mut transport = HyperTransport::default();
        app.call(environ, &mut transport);
        transport
    })
    .await;

    match dispatched {
        Ok(transport) => Ok(transport.into_response()),
        Err(e) => {
            logger::log_error(&format!("Dispatch task failed: {e}"));
            Ok(internal_error())
        }
    }
}

fn reject(app: &Application, environ: &Environ, err: &RequestError) -> Response<Full<Bytes>> {
    let mut transport = HyperTransport::default();
    app.call_rejected(environ, err, &mut transport);
    transport.into_response()
}

async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, RequestError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(RequestError::BodyTooLarge { limit })
        }
        Err(e) => Err(RequestError::Body(e.to_string())),
    }
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(MULTIPART_FORM))
}

/// Decode the text fields of a `multipart/form-data` body; file parts are
/// left in the raw body only
async fn read_multipart(content_type: &str, body: Bytes) -> Result<Params, RequestError> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| RequestError::Body(e.to_string()))?;
    let stream = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RequestError::Body(e.to_string()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let value = field.text().await.map_err(|e| RequestError::Body(e.to_string()))?;
        fields.push((name, value));
    }
    Ok(fields.into_iter().collect())
}

fn internal_error() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(b"Internal Server Error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
