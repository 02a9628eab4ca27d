// tests/cache_properties.rs

use proptest::prelude::*;
use watchcopy::cache::{ChangeCache, HistoryCache};
use watchcopy::types::EntryId;

// Small id space so sequences revisit the same entries.
fn id_strategy() -> impl Strategy<Value = EntryId> {
    (0..4u8).prop_map(|n| EntryId::new(format!("file{n}")))
}

proptest! {
    #[test]
    fn get_on_unseen_ids_is_zero_and_idempotent(
        ids in proptest::collection::vec(id_strategy(), 1..20)
    ) {
        let cache = HistoryCache::new();
        for id in &ids {
            prop_assert_eq!(cache.get(id), (0, 0));
        }
        for id in &ids {
            prop_assert_eq!(cache.get(id), (0, 0));
        }
    }

    #[test]
    fn update_always_increments_and_get_reflects_it(
        ops in proptest::collection::vec((id_strategy(), 0..1_000i64), 1..50)
    ) {
        let cache = HistoryCache::new();
        let mut expected = std::collections::HashMap::new();

        for (id, ts) in ops {
            let version = cache.update(&id, ts);
            let counter = expected.entry(id.clone()).or_insert(0u64);
            *counter += 1;
            prop_assert_eq!(version, *counter);
            prop_assert_eq!(cache.get(&id), (ts, version));
        }

        let mut keys = cache.all_keys();
        keys.sort();
        let mut expected_keys: Vec<EntryId> = expected.keys().cloned().collect();
        expected_keys.sort();
        prop_assert_eq!(keys, expected_keys);
    }

    #[test]
    fn record_if_newer_never_bumps_without_a_newer_timestamp(
        stamps in proptest::collection::vec(-5..50i64, 1..40)
    ) {
        let cache = HistoryCache::new();
        let id = EntryId::from("file");
        let mut high_water = 0i64;
        let mut versions = 0u64;

        for ts in stamps {
            let recorded = cache.record_if_newer(&id, ts);
            if ts > high_water {
                high_water = ts;
                versions += 1;
                prop_assert_eq!(recorded, Some(versions));
            } else {
                prop_assert_eq!(recorded, None);
            }
            prop_assert_eq!(cache.get(&id), (high_water, versions));
        }
    }
}
