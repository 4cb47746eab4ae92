//! Route table and dispatch boundary

use std::any::{Any, TypeId};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::pattern::Pattern;
use crate::error::RouteError;
use crate::handler::{Args, Handler};
use crate::http::{Method, Request, Response};
use crate::logger;

type Invoker = fn(Arc<Request>, Method, &Args, &'static str) -> Response;

/// Bind `H` and run its operation; a failed operation is rendered by the
/// handler's own `error`
fn invoke<H: Handler>(request: Arc<Request>, method: Method, args: &Args, name: &'static str) -> Response {
    let handler = H::bind(request);
    match handler.dispatch(method, args) {
        Ok(response) => response,
        Err(err) => {
            let message = err.to_string();
            logger::log_handler_failed(name, &message);
            handler.error(500, &message)
        }
    }
}

/// A compiled pattern paired with the handler type it serves
pub struct Route {
    pattern: Pattern,
    handler: TypeId,
    handler_name: &'static str,
    invoke: Invoker,
}

impl Route {
    pub fn new<H: Handler + 'static>(pattern: Pattern) -> Self {
        Self {
            pattern,
            handler: TypeId::of::<H>(),
            handler_name: std::any::type_name::<H>(),
            invoke: invoke::<H>,
        }
    }

    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub const fn handler_name(&self) -> &'static str {
        self.handler_name
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.source())
            .field("handler", &self.handler_name)
            .finish()
    }
}

enum Dialect {
    Regex,
    Token,
}

struct PendingRoute {
    dialect: Dialect,
    source: String,
    compile: fn(Pattern) -> Route,
}

/// Collects route declarations in order and compiles them in [`build`]
///
/// [`build`]: RouteTableBuilder::build
#[derive(Default)]
pub struct RouteTableBuilder {
    pending: Vec<PendingRoute>,
}

impl RouteTableBuilder {
    /// Declare a regular expression route
    #[must_use]
    pub fn regex<H: Handler + 'static>(mut self, pattern: impl Into<String>) -> Self {
        self.pending.push(PendingRoute {
            dialect: Dialect::Regex,
            source: pattern.into(),
            compile: Route::new::<H>,
        });
        self
    }

    /// Declare a token route such as `/user/:name/`
    #[must_use]
    pub fn token<H: Handler + 'static>(mut self, pattern: impl Into<String>) -> Self {
        self.pending.push(PendingRoute {
            dialect: Dialect::Token,
            source: pattern.into(),
            compile: Route::new::<H>,
        });
        self
    }

    /// Compile every declared pattern, failing on the first invalid one
    pub fn build(self) -> Result<RouteTable, RouteError> {
        let routes = self
            .pending
            .into_iter()
            .map(|pending| -> Result<Route, RouteError> {
                let pattern = match pending.dialect {
                    Dialect::Regex => Pattern::regex(&pending.source)?,
                    Dialect::Token => Pattern::token(&pending.source)?,
                };
                Ok((pending.compile)(pattern))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTable { routes })
    }
}

/// Ordered, immutable list of routes; the first matching route wins
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching `path`, with its captures
    pub fn resolve(&self, path: &str) -> Option<(&Route, Args)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.captures(path).map(|args| (route, args)))
    }

    /// Build a path for the first token route served by `H`
    pub fn url_for<H: Handler + 'static>(&self, values: &[&str]) -> Result<String, RouteError> {
        let wanted = TypeId::of::<H>();
        self.routes
            .iter()
            .filter(|route| route.handler == wanted)
            .find_map(|route| match &route.pattern {
                Pattern::Token(token) => Some(token.reverse(values)),
                Pattern::Regex(_) => None,
            })
            .unwrap_or_else(|| {
                Err(RouteError::Reverse {
                    pattern: String::new(),
                    reason: format!("no token route for {}", std::any::type_name::<H>()),
                })
            })
    }

    /// Route `request` to its handler
    ///
    /// Returns `None` when no pattern matches. Handler errors become the
    /// handler's own 500 error page; panics become a plain 500 carrying the
    /// panic message.
    pub fn respond(&self, request: &Arc<Request>) -> Option<Response> {
        let (route, args) = self.resolve(request.path())?;
        logger::log_route_matched(request.method(), request.path(), route.pattern.source(), route.handler_name);

        let method = request.method();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            (route.invoke)(Arc::clone(request), method, &args, route.handler_name)
        }));

        let response = match outcome {
            Ok(response) => response,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                logger::log_handler_panicked(route.handler_name, &message);
                Response::error(500, message)
            }
        };
        Some(response)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
