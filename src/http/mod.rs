//! HTTP client construction and the per-request transport seam.
mod client;
mod transport;

pub use client::build_client;
pub use transport::{HttpTransport, Transport};
