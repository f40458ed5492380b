// Single-use cache module.
// Holds warm-up results until exactly one consumer claims them.

pub mod key;
pub mod single_use;

pub use key::cache_key;
pub use single_use::{CacheEntry, SingleUseCache};
