//! Routing module
//!
//! Provides ordered, first-match-wins routing with two pattern dialects:
//! - Regex routes, matched from the start of the path
//! - Token routes (`/user/:name/`), compiled once to anchored regexes
//!
//! Matched handlers are bound to the request and invoked behind a failure
//! boundary, so handler errors and panics always come back as a 500.

mod pattern;
mod table;

pub use pattern::{Pattern, RegexPattern, TokenPattern, PLACEHOLDER_CLASS, PLACEHOLDER_MARKER};
pub use table::{Route, RouteTable, RouteTableBuilder};
