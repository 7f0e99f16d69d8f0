//! Cache Module
//!
//! Provides the insertion-ordered container base and the capacity-bounded
//! message cache built on top of it.

mod ordered_map;
mod store;


// Re-export public types
pub use ordered_map::OrderedMap;
pub use store::{Capacity, MessageCache};

// == Public Constants ==
/// Default maximum number of cached messages per channel
pub const DEFAULT_MAXIMUM_CACHE_SIZE: usize = 200;
