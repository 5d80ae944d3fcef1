pub mod extract;
pub mod locks;
pub mod sequence_cache;

pub use extract::SubsequenceExtractor;
pub use locks::{KeyGuard, KeyedLocks};
pub use sequence_cache::{CacheEntry, PinnedEntry, SequenceCache};
