//! Fetch Module
//!
//! Remote transport seam and the per-channel message manager that merges
//! fetch responses into the bounded cache.

mod manager;
mod transport;

// Re-export public types
pub use manager::{Fetched, MessageCollection, MessageManager};
pub use transport::{HttpTransport, Transport};
