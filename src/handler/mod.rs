//! Handler contract module
//!
//! A handler type is bound to a single request and answers one operation
//! per HTTP method. Unimplemented operations reply 405.

mod args;
mod contract;

pub use args::Args;
pub use contract::{Handler, HandlerError, HandlerResult};
