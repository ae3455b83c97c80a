// tests/status_stream.rs
#![cfg(unix)]

use std::error::Error;
use std::time::Duration;

use petribot::exec::{FailureKind, OperationRunner, StatusEvent, StatusKind, StatusStream};
use petribot::config::ConfigFile;
use petribot_test_utils::builders::ConfigFileBuilder;
use petribot_test_utils::{init_tracing, sh_supervisor, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

async fn drain(mut stream: StatusStream) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

fn phase(kind: StatusKind) -> u8 {
    match kind {
        StatusKind::Queued => 0,
        StatusKind::Status => 1,
        StatusKind::Progress => 2,
        StatusKind::Result => 3,
    }
}

/// Queued, then statuses, then progress, then exactly one Result last.
fn assert_well_ordered(events: &[StatusEvent]) {
    let kinds: Vec<StatusKind> = events.iter().map(StatusEvent::kind).collect();
    assert_eq!(kinds.first(), Some(&StatusKind::Queued), "kinds: {kinds:?}");
    assert_eq!(kinds.last(), Some(&StatusKind::Result), "kinds: {kinds:?}");
    assert!(
        kinds.windows(2).all(|w| phase(w[0]) <= phase(w[1])),
        "out of phase order: {kinds:?}"
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == StatusKind::Result).count(),
        1,
        "kinds: {kinds:?}"
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == StatusKind::Queued).count(),
        1,
        "kinds: {kinds:?}"
    );
}

fn pid_from_status(message: &str) -> Option<i32> {
    message
        .strip_prefix("executing (pid ")?
        .strip_suffix(')')?
        .parse()
        .ok()
}

fn pid_is_gone(pid: i32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    matches!(kill(Pid::from_raw(pid), None), Err(Errno::ESRCH))
}

async fn wait_until_gone(pid: i32) -> bool {
    for _ in 0..100 {
        if pid_is_gone(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn quick_run_reports_lifecycle_in_order() {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(5));

    let events = with_timeout(drain(sup.execute_with_status(sup.invocation("echo hello", None)))).await;

    assert_well_ordered(&events);
    let kinds: Vec<StatusKind> = events.iter().map(StatusEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            StatusKind::Queued,
            StatusKind::Status,
            StatusKind::Status,
            StatusKind::Result
        ]
    );
    let statuses: Vec<&str> = events
        .iter()
        .filter(|e| e.kind() == StatusKind::Status)
        .filter_map(StatusEvent::message)
        .collect();
    assert_eq!(statuses.first(), Some(&"initializing"));
    assert!(
        statuses.iter().any(|s| s.starts_with("executing")),
        "statuses: {statuses:?}"
    );

    let result = events.last().and_then(StatusEvent::result).expect("result");
    assert!(result.succeeded);
    assert_eq!(result.stdout, "hello\n");
}

#[tokio::test]
async fn long_run_emits_progress_heartbeats() {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(10))
        .with_progress_interval(Duration::from_millis(200));

    let events = with_timeout(drain(sup.execute_with_status(sup.invocation("sleep 1", None)))).await;

    assert_well_ordered(&events);
    let progress: Vec<&str> = events
        .iter()
        .filter(|e| e.kind() == StatusKind::Progress)
        .filter_map(StatusEvent::message)
        .collect();
    assert!(!progress.is_empty(), "no progress in {events:?}");
    assert!(progress.iter().all(|m| m.starts_with("still running")));
}

#[tokio::test]
async fn launch_failure_still_ends_with_one_result() {
    init_tracing();
    let sup = petribot::exec::ProcessSupervisor::new(
        petribot::exec::ToolCommand::new("petribot-definitely-missing-tool"),
        std::env::temp_dir(),
        Duration::from_secs(5),
    );

    let events = with_timeout(drain(sup.execute_with_status(sup.invocation("x", None)))).await;

    assert_well_ordered(&events);
    let result = events.last().and_then(StatusEvent::result).expect("result");
    assert_eq!(result.failure, Some(FailureKind::LaunchFailure));
    assert!(result.stderr.contains("petribot-definitely-missing-tool"));
}

#[tokio::test]
async fn timeout_is_delivered_through_the_stream() {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(1));

    let result = with_timeout(sup.execute_with_status(sup.invocation("sleep 10", None)).collect_result())
        .await
        .expect("stream ended without result");

    assert_eq!(result.failure, Some(FailureKind::Timeout));
    assert!(result.stderr.contains("timed out after 1 seconds"));
}

#[tokio::test]
async fn slow_consumer_still_receives_the_result() {
    init_tracing();
    // Tiny buffer plus frequent heartbeats: advisory events get dropped,
    // the result must not.
    let sup = sh_supervisor(Duration::from_secs(10))
        .with_status_buffer(1)
        .with_progress_interval(Duration::from_millis(50));
    let mut stream = sup.execute_with_status(sup.invocation("sleep 1; echo done", None));

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let events = with_timeout(async {
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        events
    })
    .await;

    let result = events.last().and_then(StatusEvent::result).expect("result");
    assert!(result.succeeded);
    assert_eq!(result.stdout, "done\n");
}

#[tokio::test]
async fn dropping_after_executing_kills_the_process() -> TestResult {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(60));
    let mut stream = sup.execute_with_status(sup.invocation("sleep 30", None));

    let pid = with_timeout(async {
        while let Some(event) = stream.next().await {
            if let Some(pid) = event.message().and_then(pid_from_status) {
                return Some(pid);
            }
        }
        None
    })
    .await
    .ok_or("no executing status with a pid")?;

    assert!(!pid_is_gone(pid), "process {pid} exited on its own");
    drop(stream);

    assert!(wait_until_gone(pid).await, "process {pid} survived abandonment");
    Ok(())
}

#[tokio::test]
async fn dropping_after_first_status_leaves_nothing_running() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("child.pid");
    let sup = sh_supervisor(Duration::from_secs(60));

    let op = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
    let mut stream = sup.execute_with_status(sup.invocation(op, None));

    let first = with_timeout(stream.next()).await;
    assert_eq!(first.map(|e| e.kind()), Some(StatusKind::Queued));
    let second = with_timeout(stream.next()).await;
    assert!(second.is_some());
    drop(stream);

    // Either the process was never started, or it has been killed.
    tokio::time::sleep(Duration::from_millis(500)).await;
    if let Ok(text) = std::fs::read_to_string(&pid_file) {
        if let Ok(pid) = text.trim().parse::<i32>() {
            assert!(wait_until_gone(pid).await, "process {pid} survived abandonment");
        }
    }
    Ok(())
}

#[tokio::test]
async fn supervisor_serves_as_operation_runner() {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(5));
    let runner: &dyn OperationRunner = &sup;

    let result = with_timeout(runner.run_with_status("echo via runner").collect_result())
        .await
        .expect("result");

    assert!(result.succeeded);
    assert_eq!(result.stdout, "via runner\n");
}

#[tokio::test]
async fn out_of_range_progress_interval_still_yields_a_result() {
    init_tracing();
    let sup = sh_supervisor(Duration::from_secs(5))
        .with_progress_interval(Duration::from_secs(u64::MAX));

    let events = with_timeout(drain(
        sup.execute_with_status(sup.invocation("echo hi", Some(Duration::from_secs(5)))),
    ))
    .await;

    assert_well_ordered(&events);
    let result = events.last().and_then(StatusEvent::result).expect("result");
    assert!(result.succeeded);
    assert_eq!(result.stdout, "hi\n");
}

#[test]
fn out_of_range_progress_interval_is_rejected_by_config() {
    let raw = {
        let mut raw = ConfigFileBuilder::new().raw();
        raw.supervisor.progress_interval_seconds = u64::MAX;
        raw
    };

    assert!(ConfigFile::try_from(raw).is_err());
}
