//! HTTP surface: router, handlers and session auth.

pub mod handlers;
pub mod router;
pub mod session;

pub use router::{AppState, app_router};
