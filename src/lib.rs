// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod fixture;
pub mod logging;
pub mod monitor;
pub mod provider;
pub mod report;
pub mod stats;
pub mod types;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cache::HistoryCache;
use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile, Source, SourceSection};
use crate::config::{load_from_path, resolve_relative_to};
use crate::fixture::load_fixture;
use crate::monitor::Monitor;
use crate::provider::mock::MockProvider;
use crate::provider::{LocalFsProvider, MetadataProvider};
use crate::report::{build_report, log_report, ReportLine};
use crate::stats::StatsCounter;
use crate::types::EntryId;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cycles: usize,
    /// The watch report, sorted by id.
    pub report: Vec<ReportLine>,
    /// Final counter values, see [`stats`].
    pub stats: BTreeMap<String, u64>,
}

impl RunSummary {
    /// Report line for `id`, if the report has one.
    pub fn line(&self, id: &str) -> Option<&ReportLine> {
        self.report.iter().find(|line| line.id.as_str() == id)
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (and the `--datafile` override)
/// - the provider, watchlist and per-cycle plan for the configured source
/// - the monitor, driven cycle by cycle
/// - the final watch report and stats
///
/// Returns `None` for a dry run.
pub async fn run(args: CliArgs) -> Result<Option<RunSummary>> {
    let cfg = resolve_config(&args.config, args.datafile.as_deref())?;

    let plan = RunPlan::from_config(&args.config, &cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &plan);
        return Ok(None);
    }

    let cache = Arc::new(HistoryCache::new());
    let stats = Arc::new(StatsCounter::new());

    let mut monitor = Monitor::new(plan.provider(), plan.watchlist.clone(), cache.clone())
        .with_stats(stats.clone())
        .with_queue_capacity(cfg.config.queue_capacity);
    monitor.start()?;

    let interval = cfg.config.watch_interval();
    for (cycle, step) in plan.steps.iter().enumerate() {
        plan.apply_step(step);
        debug!(cycle, touched = step.len(), "evaluating watchlist");
        monitor.evaluate_watchlist().await?;
        tokio::time::sleep(interval).await;
    }

    monitor.shut_down().await?;
    info!(cycles = plan.steps.len(), "all cycles evaluated");

    // The report stats explicit entries through the provider.
    let provider = plan.provider();
    let watchlist = monitor.watchlist().to_vec();
    let report = tokio::task::spawn_blocking(move || {
        build_report(cache.as_ref(), &watchlist, provider.as_ref())
    })
    .await?;
    log_report(&report);
    stats.dump_to_log();

    Ok(Some(RunSummary {
        cycles: plan.steps.len(),
        report,
        stats: stats.snapshot(),
    }))
}

/// Load the config, letting `--datafile` replace the `[source]` section.
///
/// With a datafile override a missing config file is not an error.
fn resolve_config(config_path: &Path, datafile: Option<&Path>) -> Result<ConfigFile> {
    let raw = match datafile {
        Some(datafile) => {
            let mut raw = if config_path.exists() {
                load_from_path(config_path)?
            } else {
                RawConfigFile::default()
            };
            // Relative to the working directory, not to the config file.
            raw.source = SourceSection::fixture(std::path::absolute(datafile)?);
            raw
        }
        None => load_from_path(config_path)?,
    };
    Ok(ConfigFile::try_from(raw)?)
}

enum Backend {
    Mock(MockProvider),
    Local(LocalFsProvider),
}

/// Everything needed to drive the monitor for one run.
struct RunPlan {
    backend: Backend,
    watchlist: Vec<EntryId>,
    /// Ids to touch before each cycle; one entry per cycle.
    steps: Vec<Vec<EntryId>>,
}

impl RunPlan {
    fn from_config(config_path: &Path, cfg: &ConfigFile) -> Result<Self> {
        match &cfg.source {
            Source::Fixture { datafile } => {
                let fixture = load_fixture(resolve_relative_to(config_path, datafile))?;
                // A fixture without update steps still gets one evaluation.
                let steps = if fixture.updates.is_empty() {
                    vec![Vec::new()]
                } else {
                    fixture.updates
                };
                Ok(Self {
                    backend: Backend::Mock(fixture.provider),
                    watchlist: fixture.watchlist,
                    steps,
                })
            }
            Source::Directory {
                root,
                watch,
                cycles,
            } => Ok(Self {
                backend: Backend::Local(LocalFsProvider::new(resolve_relative_to(
                    config_path,
                    root,
                ))),
                watchlist: watch.clone(),
                steps: vec![Vec::new(); *cycles],
            }),
        }
    }

    fn provider(&self) -> Arc<dyn MetadataProvider> {
        match &self.backend {
            Backend::Mock(fp) => Arc::new(fp.clone()),
            Backend::Local(fp) => Arc::new(fp.clone()),
        }
    }

    /// Touch the step's ids. Only the mock backend can be written to.
    fn apply_step(&self, step: &[EntryId]) {
        if let Backend::Mock(fp) = &self.backend {
            for id in step {
                fp.update_last_modified(id);
            }
        }
    }
}

fn print_dry_run(cfg: &ConfigFile, plan: &RunPlan) {
    println!("watchcopy dry-run");
    println!("  config.watch_interval_ms = {}", cfg.config.watch_interval_ms);
    println!("  config.queue_capacity = {}", cfg.config.queue_capacity);
    println!();

    match (&cfg.source, &plan.backend) {
        (Source::Fixture { datafile }, Backend::Mock(fp)) => {
            println!("source: fixture {}", datafile.display());
            println!("  entries: {}", fp.len());
        }
        (Source::Directory { root, .. }, _) => {
            println!("source: directory {}", root.display());
        }
        _ => {}
    }
    println!("  cycles: {}", plan.steps.len());
    println!();

    println!("watchlist ({}):", plan.watchlist.len());
    for id in &plan.watchlist {
        println!("  - {id}");
    }

    debug!("dry-run complete (nothing evaluated)");
}
