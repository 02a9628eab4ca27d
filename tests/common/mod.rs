#![allow(dead_code, unused_imports)]

pub use watchcopy_test_utils::builders;
pub use watchcopy_test_utils::faulty_provider;
pub use watchcopy_test_utils::gated_provider;
pub use watchcopy_test_utils::{init_tracing, with_timeout};

use watchcopy::cache::ChangeCache;
use watchcopy::types::EntryId;

/// `(last_modified, version)` for an id given as a string.
pub fn cached(cache: &dyn ChangeCache, id: &str) -> (i64, u64) {
    cache.get(&EntryId::from(id))
}

pub fn id(s: &str) -> EntryId {
    EntryId::from(s)
}
