//! Fakes and helpers shared by the `watchrun` integration tests.
//!
//! The fakes stand in for each collaborator a `Watcher` is built from, and
//! record what the watcher did with them: [`StaticFinder`],
//! [`ScriptedNotifier`], [`RecordingExecutor`] and [`RecordingLogger`].
//! [`WatcherHarness`] wires all four together.

pub mod builders;
pub mod fake_executor;
pub mod fake_finder;
pub mod fake_notifier;
pub mod harness;
pub mod recording_logger;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

pub use fake_executor::{Execution, RecordingExecutor};
pub use fake_finder::StaticFinder;
pub use fake_notifier::{NotifierHandle, ScriptedNotifier};
pub use harness::{StartedWatcher, WatcherHarness};
pub use recording_logger::RecordingLogger;

/// Upper bound for any single test that touches real processes or the real
/// filesystem.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Initialise tracing for tests, once per test binary.
///
/// Output goes through the test writer, so it only shows for failing tests
/// (or with `--nocapture`). The filter is read from `WATCHRUN_LOG`, e.g.
/// `WATCHRUN_LOG=watchrun=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(watchrun::logging::LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test timed out")
}
