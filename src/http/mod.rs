//! HTTP model module
//!
//! Request and response types plus the status table, independent of any
//! particular transport.

pub mod request;
pub mod response;
pub mod status;

// Re-export commonly used types
pub use request::{Environ, Method, Params, Request};
pub use response::{Response, SerializedResponse, DEFAULT_CONTENT_TYPE};
