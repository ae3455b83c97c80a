pub mod builders;
pub mod fakes;

use std::sync::Once;
use std::time::Duration;

use petribot::exec::{ProcessSupervisor, ToolCommand};
use tracing_subscriber::{EnvFilter, fmt};

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

/// Run a future with a 10-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// A supervisor whose "tool" is `sh -c`, so operations are shell snippets.
///
/// Runs in the system temp directory with the given default deadline.
pub fn sh_supervisor(timeout: Duration) -> ProcessSupervisor {
    ProcessSupervisor::new(
        ToolCommand::new("sh").with_args(["-c"]),
        std::env::temp_dir(),
        timeout,
    )
}
