//! Public entry points for network clients.

pub mod http;

pub use http::{router, AppState};
