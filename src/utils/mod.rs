pub mod cache;
pub mod config_loader;

pub use cache::{CacheItem, CacheStats, RebaseCache, RebaseKey, ResultCache};
pub use config_loader::*;
