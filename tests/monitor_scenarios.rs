// tests/monitor_scenarios.rs

mod common;
use crate::common::builders::{scenario_tree, MonitorBuilder, MonitorParts, TreeBuilder};
use crate::common::faulty_provider::FaultyProvider;
use crate::common::{cached, id, init_tracing, with_timeout};

use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use watchcopy::cache::ChangeCache;
use watchcopy::provider::MetadataProvider;
use watchcopy::stats;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn first_cycle_copies_reachable_files_once() -> TestResult {
    init_tracing();
    let fp = scenario_tree();

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(fp.clone())).watch("dir1").build();

    monitor.start()?;
    with_timeout(monitor.evaluate_watchlist()).await?;
    with_timeout(monitor.shut_down()).await?;

    let file2 = fp.retrieve_metadata(&id("file2"))?.last_modified;
    let file3 = fp.retrieve_metadata(&id("file3"))?.last_modified;

    assert_eq!(cached(cache.as_ref(), "file2"), (file2, 1));
    assert_eq!(cached(cache.as_ref(), "file3"), (file3, 1));
    assert_eq!(fp.copy_count(&id("file2")), 1);
    assert_eq!(fp.copy_count(&id("file3")), 1);

    // file1 sits at the root, outside dir1.
    assert_eq!(fp.copy_count(&id("file1")), 0);
    assert!(!cache.all_keys().contains(&id("file1")));
    assert_eq!(fp.copies().len(), 2);
    Ok(())
}

#[tokio::test]
async fn touched_file_gets_next_version_and_others_stay() -> TestResult {
    init_tracing();
    let fp = scenario_tree();

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(fp.clone())).watch("dir1").build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;

    fp.update_last_modified(&id("file2"));
    monitor.evaluate_watchlist().await?;
    monitor.shut_down().await?;

    let file2 = fp.retrieve_metadata(&id("file2"))?.last_modified;
    assert_eq!(cached(cache.as_ref(), "file2"), (file2, 2));
    assert_eq!(cached(cache.as_ref(), "file3").1, 1);

    assert_eq!(
        fp.copies(),
        vec![(id("file2"), 1), (id("file3"), 1), (id("file2"), 2)]
    );
    Ok(())
}

#[tokio::test]
async fn unchanged_cycles_copy_nothing() -> TestResult {
    init_tracing();
    let fp = scenario_tree();

    let MonitorParts {
        mut monitor,
        cache,
        stats,
    } = MonitorBuilder::new(Arc::new(fp.clone()))
        .watch("dir1")
        .watch("file1")
        .build();

    monitor.start()?;
    for _ in 0..3 {
        monitor.evaluate_watchlist().await?;
    }
    monitor.shut_down().await?;

    assert_eq!(fp.copies().len(), 3);
    for name in ["file1", "file2", "file3"] {
        assert_eq!(cached(cache.as_ref(), name).1, 1, "{name}");
    }
    assert_eq!(stats.get(stats::EVALUATED), 9);
    assert_eq!(stats.get(stats::COPIED), 3);
    assert_eq!(stats.get(stats::UNCHANGED), 6);
    Ok(())
}

#[tokio::test]
async fn copy_happens_iff_timestamp_is_positive() -> TestResult {
    init_tracing();
    let fp = TreeBuilder::new()
        .dir("dir1", "")
        .file("fresh", "dir1")
        .file("epoch", "dir1")
        .build();
    fp.set_last_modified(&id("epoch"), 0);

    let MonitorParts {
        mut monitor, cache, ..
    } = MonitorBuilder::new(Arc::new(fp.clone())).watch("dir1").build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;
    monitor.shut_down().await?;

    assert_eq!(fp.copies(), vec![(id("fresh"), 1)]);
    assert_eq!(cached(cache.as_ref(), "epoch"), (0, 0));
    Ok(())
}

#[tokio::test]
async fn nested_explicit_directory_is_expanded_once() -> TestResult {
    init_tracing();
    let faulty = FaultyProvider::new(scenario_tree());
    let children_calls = faulty.children_calls();

    let MonitorParts {
        mut monitor, stats, ..
    } = MonitorBuilder::new(Arc::new(faulty))
        .watch("dir1")
        .watch("dir2")
        .build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;
    monitor.shut_down().await?;

    // dir1, dir2 and dir3 are each listed exactly once.
    assert_eq!(children_calls.load(Ordering::SeqCst), 3);
    // file2 and file3, with no second dispatch of file3 via dir1.
    assert_eq!(stats.get(stats::EVALUATED), 2);
    assert_eq!(stats.get(stats::COPIED), 2);
    Ok(())
}

#[tokio::test]
async fn file_reached_twice_in_one_cycle_is_copied_once() -> TestResult {
    init_tracing();
    let fp = scenario_tree();

    let MonitorParts {
        mut monitor,
        cache,
        stats,
    } = MonitorBuilder::new(Arc::new(fp.clone()))
        .watch("dir2")
        .watch("file3")
        .build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;
    monitor.shut_down().await?;

    assert_eq!(stats.get(stats::EVALUATED), 2);
    assert_eq!(fp.copies(), vec![(id("file3"), 1)]);
    assert_eq!(cached(cache.as_ref(), "file3").1, 1);
    Ok(())
}

#[tokio::test]
async fn watchlist_is_not_extended_by_discovered_directories() -> TestResult {
    init_tracing();
    let fp = scenario_tree();

    let MonitorParts { mut monitor, .. } =
        MonitorBuilder::new(Arc::new(fp.clone())).watch("dir1").build();

    monitor.start()?;
    monitor.evaluate_watchlist().await?;
    monitor.evaluate_watchlist().await?;
    monitor.shut_down().await?;

    assert_eq!(monitor.watchlist(), &[id("dir1")]);
    assert!(!monitor.is_explicit(&id("dir2")));
    Ok(())
}
