//! Middleware for the API
//!
//! Request tracing, security headers and session-context extraction.

mod security;
mod session;
mod tracing;

pub use security::security_headers;
pub use session::{AdminSession, Session};
pub use tracing::request_tracing;
