//! Minimal HTTP routing and response construction
//!
//! An ordered table of `(pattern, handler type)` routes is matched against
//! each request path; the first match binds a fresh handler to the request
//! and calls the operation for its method. The [`app::Application`]
//! dispatcher wraps this with request parsing, default 404/400 pages and
//! serialization to a transport.
//!
//! ```
//! use std::sync::Arc;
//! use mnml::app::Application;
//! use mnml::handler::{Args, Handler, HandlerResult};
//! use mnml::http::{Environ, Request, Response};
//! use mnml::routing::RouteTable;
//!
//! struct Item;
//!
//! impl Handler for Item {
//!     fn bind(_request: Arc<Request>) -> Self {
//!         Self
//!     }
//!
//!     fn get(&self, args: &Args) -> HandlerResult {
//!         Ok(Response::new(format!("{} #{}", args.require(0)?, args.require(1)?)))
//!     }
//! }
//!
//! let routes = RouteTable::builder()
//!     .regex::<Item>(r"^/(\w+)/(\d+)/$")
//!     .build()?;
//! let app = Application::new(routes);
//!
//! let response = app.handle(Environ::new("GET", "/widgets/42/"));
//! assert_eq!(response.content().as_ref(), b"widgets #42");
//! assert_eq!(app.handle(Environ::new("GET", "/unknown")).status_code(), 404);
//! # Ok::<(), mnml::error::RouteError>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
