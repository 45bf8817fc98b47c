pub mod builders;

use std::path::Path;
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};

use offload::Dispatcher;
use offload::exec::RecordingRunner;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Dispatcher wired to a fresh `RecordingRunner`, plus a handle to inspect it.
pub fn recording_dispatcher() -> (Dispatcher, Arc<RecordingRunner>) {
    let dispatcher = Dispatcher::default();
    let runner = Arc::new(RecordingRunner::new());
    dispatcher
        .set_runner(Arc::clone(&runner))
        .expect("a runner instance is always accepted");
    (dispatcher, runner)
}

/// Poll `path` until it contains `needle` or `timeout` elapses.
///
/// Background commands finish on their own schedule, so tests that inspect
/// their output wait for it instead of sleeping a fixed amount.
pub fn wait_for_file_contains(path: &Path, needle: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(contents) = std::fs::read_to_string(path) {
            if contents.contains(needle) {
                return true;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Poll until `path` exists or `timeout` elapses.
pub fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    path.exists()
}
