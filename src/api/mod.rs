//! HTTP surface of the chunking service.

pub mod handlers;

pub use handlers::{app, AppState};
