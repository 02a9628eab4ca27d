// tests/dispatch_backpressure.rs

mod common;
use crate::common::builders::{MonitorBuilder, MonitorParts};
use crate::common::gated_provider::GatedProvider;
use crate::common::{init_tracing, with_timeout};

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use watchcopy::cache::ChangeCache;
use watchcopy::provider::mock::MockProvider;
use watchcopy::types::EntryId;

type TestResult = Result<(), Box<dyn Error>>;

fn generated_tree() -> MockProvider {
    let mut rng = StdRng::seed_from_u64(42);
    MockProvider::generate_with_rng(500, 25, &mut rng)
}

fn flat_tree(files: usize) -> MockProvider {
    let fp = MockProvider::new();
    for i in 1..=files {
        fp.add_file(format!("file{i}"), EntryId::root());
    }
    fp
}

fn file_ids(fp: &MockProvider) -> Vec<EntryId> {
    fp.entry_ids()
        .into_iter()
        .filter(|id| id.as_str().starts_with("file"))
        .collect()
}

#[tokio::test]
async fn tiny_queue_still_delivers_every_file_once() -> TestResult {
    init_tracing();
    let fp = generated_tree();

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(fp.clone()))
        .watch("")
        .queue_capacity(1)
        .build();

    monitor.start()?;
    with_timeout(monitor.evaluate_watchlist()).await?;
    with_timeout(monitor.shut_down()).await?;

    let copies = fp.copies();
    assert_eq!(copies.len(), 500);
    assert!(copies.iter().all(|(_, version)| *version == 1));
    for id in file_ids(&fp) {
        assert_eq!(cache.get(&id).1, 1, "{id}");
    }
    Ok(())
}

#[tokio::test]
async fn random_updates_bump_exactly_the_touched_files() -> TestResult {
    init_tracing();
    let fp = generated_tree();

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(fp.clone()))
        .watch("")
        .queue_capacity(8)
        .build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;

    let mut expected: HashMap<EntryId, u64> =
        file_ids(&fp).into_iter().map(|id| (id, 1)).collect();

    for _ in 0..5 {
        let mut touched = Vec::new();
        for _ in 0..20 {
            if let Some(id) = fp.update_any() {
                touched.push(id);
            }
        }
        touched.sort();
        touched.dedup();
        for id in touched {
            // Directories are touched too but never versioned.
            if let Some(version) = expected.get_mut(&id) {
                *version += 1;
            }
        }
        with_timeout(monitor.evaluate_watchlist()).await?;
    }
    with_timeout(monitor.shut_down()).await?;

    for (id, version) in &expected {
        assert_eq!(cache.get(id).1, *version, "{id}");
    }
    let total: u64 = expected.values().sum();
    assert_eq!(fp.copies().len() as u64, total);
    Ok(())
}

#[tokio::test]
async fn full_queue_stalls_the_cycle_until_copies_resume() -> TestResult {
    init_tracing();
    let fp = flat_tree(10);
    let gated = GatedProvider::new(fp.clone());

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(gated.clone()))
        .watch("")
        .queue_capacity(2)
        .build();

    monitor.start()?;

    // One file is held in copy_file and two fill the queue; the fourth send waits.
    let stalled =
        tokio::time::timeout(Duration::from_millis(200), monitor.evaluate_watchlist()).await;
    assert!(stalled.is_err(), "cycle finished while the queue was full");
    assert!(fp.copies().is_empty());

    gated.open();
    with_timeout(monitor.evaluate_watchlist()).await?;
    with_timeout(monitor.shut_down()).await?;

    let copies = fp.copies();
    assert_eq!(copies.len(), 10);
    assert!(copies.iter().all(|(_, version)| *version == 1));
    for id in file_ids(&fp) {
        assert_eq!(cache.get(&id).1, 1, "{id}");
    }
    Ok(())
}

#[tokio::test]
async fn cycle_returns_without_waiting_for_copies() -> TestResult {
    init_tracing();
    let fp = flat_tree(10);
    let gated = GatedProvider::new(fp.clone());

    let MonitorParts { mut monitor, .. } = MonitorBuilder::new(Arc::new(gated.clone()))
        .watch("")
        .queue_capacity(16)
        .build();

    monitor.start()?;
    with_timeout(monitor.evaluate_watchlist()).await?;

    // Every file is queued or held by the consumer, none copied yet.
    assert!(fp.copies().is_empty());

    gated.open();
    with_timeout(monitor.shut_down()).await?;
    assert_eq!(fp.copies().len(), 10);
    Ok(())
}
