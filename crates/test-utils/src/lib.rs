//! Shared helpers for watchcopy's integration tests.
//!
//! - [`builders`]: mock trees and pre-wired monitors
//! - [`faulty_provider`]: a provider wrapper that injects failures
//! - [`gated_provider`]: a provider whose copies wait for the test

pub mod builders;
pub mod faulty_provider;
pub mod gated_provider;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Upper bound for a single monitor cycle or shutdown in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Reads `WATCHCOPY_LOG` (falling back to `RUST_LOG`, then `warn`), so a
/// failing scenario can be rerun with `WATCHCOPY_LOG=watchcopy=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("WATCHCOPY_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `f`, panicking if it takes longer than [`TEST_TIMEOUT`].
///
/// A hung evaluation usually means the dispatch consumer died and the
/// queue filled up.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("timed out after {TEST_TIMEOUT:?}"))
}
