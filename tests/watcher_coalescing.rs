// tests/watcher_coalescing.rs

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::{sleep, Duration};

use watchrun::engine::{WatcherBuilder, WatcherState};
use watchrun::errors::WatchError;
use watchrun::exec::{ExecFuture, Executor};
use watchrun::watch::{EventError, Notification, NotificationEvent};
use watchrun_test_utils::builders::{dir_event, file_event, write};
use watchrun_test_utils::{
    init_tracing, RecordingExecutor, RecordingLogger, ScriptedNotifier, StaticFinder,
    WatcherHarness,
};

type TestResult = Result<(), Box<dyn Error>>;

const WINDOW: Duration = Duration::from_millis(250);

#[tokio::test(start_paused = true)]
async fn two_writes_within_window_trigger_once() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    w.send(write("root/a.txt"));
    sleep(Duration::from_millis(50)).await;
    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.paths(), vec!["root/a.txt".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn separate_bursts_trigger_separately() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;
    w.send(write("root/b.txt"));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(
        w.executor.paths(),
        vec!["root/a.txt".to_string(), "root/b.txt".to_string()]
    );

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn events_keep_the_batch_open_while_they_arrive() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    // Ten events 100ms apart never leave a quiet period longer than the window.
    for i in 0..10 {
        w.send(write(&format!("root/{i}.txt")));
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(w.executor.count(), 0);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.paths(), vec!["root/0.txt".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn oldest_qualifying_event_wins() -> TestResult {
    init_tracing();

    let w = WatcherHarness::with(
        &["root"],
        Some(r".*\.txt$"),
        RecordingExecutor::new(),
        WINDOW,
    )
    .start();

    w.send(write("root/a.bin"));
    w.send(write("root/b.txt"));
    w.send(write("root/c.txt"));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.paths(), vec!["root/b.txt".to_string()]);
    assert!(w.logger.contains("superseded"));

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn filtered_path_never_executes() -> TestResult {
    init_tracing();

    let w = WatcherHarness::with(
        &["root"],
        Some(r".*\.txt$"),
        RecordingExecutor::new(),
        WINDOW,
    )
    .start();

    w.send(write("root/a.bin"));
    sleep(Duration::from_secs(1)).await;
    w.send(file_event("root/b.bin", Notification::CREATE));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.count(), 0);
    // Debug lines are recorded even though nothing ran.
    assert!(w.logger.contains("rejected by filter"));

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn busy_executor_drops_events_instead_of_queueing() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    let busy = w.executor.hold_running();
    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.count(), 0);

    drop(busy);
    // Nothing was queued while busy.
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.count(), 0);

    w.send(write("root/b.txt"));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.paths(), vec!["root/b.txt".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn executions_never_overlap() -> TestResult {
    init_tracing();

    let executor = RecordingExecutor::new().with_busy(Duration::from_secs(2));
    let w = WatcherHarness::with(&["root"], None, executor, WINDOW).start();

    // Flushed around t=500ms; busy until about t=2.5s.
    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;
    assert!(w.executor.running());

    // Flushed while still busy: dropped.
    w.send(write("root/b.txt"));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.count(), 1);

    // Busy period is over by now.
    sleep(Duration::from_secs(1)).await;
    assert!(!w.executor.running());
    w.send(write("root/c.txt"));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(
        w.executor.paths(),
        vec!["root/a.txt".to_string(), "root/c.txt".to_string()]
    );

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn remove_unwatches_path_and_triggers() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root/a.txt"]).start();

    w.send(file_event("root/a.txt", Notification::REMOVE));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.notifier.removed(), vec![PathBuf::from("root/a.txt")]);
    assert_eq!(w.executor.paths(), vec!["root/a.txt".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn superseded_rename_is_still_unwatched() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    w.send(write("root/a.txt"));
    w.send(file_event("root/b.txt", Notification::RENAME));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.paths(), vec!["root/a.txt".to_string()]);
    assert_eq!(w.notifier.removed(), vec![PathBuf::from("root/b.txt")]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn classification_errors_only_trigger_for_removals() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    let mut broken = file_event("root/a.txt", Notification::WRITE | Notification::ERROR);
    broken.error = Some(EventError::Source("stat failed".to_string()));
    w.send(broken);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.count(), 0);

    let mut gone = file_event("root/b.txt", Notification::REMOVE | Notification::ERROR);
    gone.error = Some(EventError::Source("stat failed".to_string()));
    w.send(gone);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(w.executor.paths(), vec!["root/b.txt".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn directory_events_trigger() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    w.send(dir_event("root/sub", Notification::CREATE));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.paths(), vec!["root/sub".to_string()]);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn file_event_without_triggering_flags_is_ignored() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();

    w.send(file_event("root/a.txt", Notification::empty()));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.count(), 0);

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn fatal_event_stops_watcher_and_closes_notifier_once() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();
    let notifier = w.notifier.clone();

    w.send(NotificationEvent::fatal("inotify queue overflow"));
    let (state, result) = w.join().await;

    match result {
        Err(WatchError::NotifierStopped(EventError::Source(msg))) => {
            assert!(msg.contains("overflow"), "unexpected cause: {msg}");
        }
        other => panic!("expected NotifierStopped, got {other:?}"),
    }
    assert_eq!(state, WatcherState::Stopped);
    assert_eq!(notifier.closes(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_notifier_once() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();
    let notifier = w.notifier.clone();
    sleep(Duration::from_millis(10)).await;

    let (state, result) = w.stop().await;
    result?;

    assert_eq!(state, WatcherState::Stopped);
    assert_eq!(notifier.closes(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stream_end_stops_watcher() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();
    let notifier = w.notifier.clone();

    notifier.end_stream();
    let (state, result) = w.join().await;
    result?;

    assert_eq!(state, WatcherState::Stopped);
    assert_eq!(notifier.closes(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unflushed_batch_is_dropped_on_shutdown() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root"]).start();
    let executor = w.executor.clone();

    w.send(write("root/a.txt"));
    let (_, result) = w.stop().await;
    result?;

    assert_eq!(executor.count(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn in_flight_execution_finishes_before_work_returns() -> TestResult {
    init_tracing();

    let executor = RecordingExecutor::new().with_busy(Duration::from_secs(5));
    let w = WatcherHarness::with(&["root"], None, executor, WINDOW).start();
    let executor = w.executor.clone();
    let logger = w.logger.clone();

    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;
    assert!(executor.running());

    let (_, result) = w.stop().await;
    result?;

    assert!(!executor.running());
    assert!(logger.contains("finished command for root/a.txt"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn executor_failure_is_logged_and_watching_continues() -> TestResult {
    init_tracing();

    let w = WatcherHarness::with(&["root"], None, RecordingExecutor::new().failing(), WINDOW)
        .start();

    w.send(write("root/a.txt"));
    sleep(Duration::from_secs(1)).await;
    w.send(write("root/b.txt"));
    sleep(Duration::from_secs(1)).await;

    assert_eq!(w.executor.count(), 2);
    assert!(w.logger.contains("command for root/a.txt failed"));

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

/// Executor whose `exec` panics before returning a future.
#[derive(Debug)]
struct PanickingExecutor;

impl Executor for PanickingExecutor {
    fn running(&self) -> bool {
        false
    }

    fn exec(&self, _event: &NotificationEvent, path: &str) -> ExecFuture {
        panic!("cannot start command for {path}");
    }
}

#[tokio::test(start_paused = true)]
async fn coalescing_task_panic_is_reported_as_failure() -> TestResult {
    init_tracing();

    let (notifier, handle) = ScriptedNotifier::new();
    let mut watcher = WatcherBuilder::new("panicky")
        .finder(StaticFinder::new(["root"]))
        .notifier(notifier)
        .executor(Arc::new(PanickingExecutor))
        .coalesce_window(WINDOW)
        .build()?;
    let task = tokio::spawn(async move {
        let result = watcher.work().await;
        (watcher.state(), result)
    });

    sleep(Duration::from_millis(10)).await;
    assert!(handle.send(write("root/a.txt")));
    sleep(Duration::from_secs(1)).await;

    // The receive loop only notices once it has something to forward.
    handle.send(write("root/b.txt"));
    let (state, result) = task.await?;

    assert_eq!(state, WatcherState::Stopped);
    assert!(
        matches!(result, Err(WatchError::CoalescerFailed(_))),
        "got {result:?}"
    );
    assert_eq!(handle.closes(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn registers_every_found_location() -> TestResult {
    init_tracing();

    let w = WatcherHarness::new(&["root", "root/a", "root/b"]).start();
    sleep(Duration::from_millis(10)).await;

    assert_eq!(
        w.notifier.added(),
        vec![
            PathBuf::from("root"),
            PathBuf::from("root/a"),
            PathBuf::from("root/b"),
        ]
    );

    let (_, result) = w.stop().await;
    result?;
    Ok(())
}

#[tokio::test]
async fn finder_failure_is_returned_before_registering() -> TestResult {
    init_tracing();

    let (notifier, handle) = ScriptedNotifier::new();
    let mut watcher = WatcherBuilder::new("broken")
        .finder(StaticFinder::failing())
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .logger(Arc::new(RecordingLogger::new()))
        .build()?;

    let err = watcher.work().await.unwrap_err();

    assert!(matches!(err, WatchError::EmptyGlob(_)));
    assert!(handle.added().is_empty());
    assert_eq!(handle.closes(), 1);
    assert_eq!(watcher.state(), WatcherState::Stopped);
    Ok(())
}

#[tokio::test]
async fn empty_location_list_is_an_error() -> TestResult {
    init_tracing();

    let (notifier, _handle) = ScriptedNotifier::new();
    let mut watcher = WatcherBuilder::new("empty")
        .finder(StaticFinder::new(Vec::<PathBuf>::new()))
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .build()?;

    let err = watcher.work().await.unwrap_err();
    assert!(matches!(err, WatchError::NoLocations(_)));
    Ok(())
}

#[tokio::test]
async fn registration_failure_aborts_startup() -> TestResult {
    init_tracing();

    let (notifier, handle) = ScriptedNotifier::new();
    let notifier = notifier.fail_on_add("root/b");
    let mut watcher = WatcherBuilder::new("register")
        .finder(StaticFinder::new(["root/a", "root/b", "root/c"]))
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .logger(Arc::new(RecordingLogger::new()))
        .build()?;

    let err = watcher.work().await.unwrap_err();

    match err {
        WatchError::Register { location, .. } => assert_eq!(location, PathBuf::from("root/b")),
        other => panic!("expected Register, got {other:?}"),
    }
    assert_eq!(handle.added(), vec![PathBuf::from("root/a")]);
    assert_eq!(handle.closes(), 1);
    Ok(())
}

#[tokio::test]
async fn work_cannot_be_restarted() -> TestResult {
    init_tracing();

    let (notifier, _handle) = ScriptedNotifier::new();
    let mut watcher = WatcherBuilder::new("once")
        .finder(StaticFinder::failing())
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .build()?;

    let _ = watcher.work().await;
    let err = watcher.work().await.unwrap_err();

    assert!(matches!(err, WatchError::AlreadyStarted(name) if name == "once"));
    Ok(())
}

#[test]
fn builder_requires_finder_notifier_and_executor() {
    let err = WatcherBuilder::new("x").build().unwrap_err();
    assert!(matches!(err, WatchError::MissingCollaborator("finder")));

    let err = WatcherBuilder::new("x")
        .finder(StaticFinder::new(["."]))
        .build()
        .unwrap_err();
    assert!(matches!(err, WatchError::MissingCollaborator("notifier")));

    let (notifier, _handle) = ScriptedNotifier::new();
    let err = WatcherBuilder::new("x")
        .finder(StaticFinder::new(["."]))
        .notifier(notifier)
        .build()
        .unwrap_err();
    assert!(matches!(err, WatchError::MissingCollaborator("executor")));
}

#[test]
fn builder_defaults_window_and_rejects_zero() {
    let (notifier, _handle) = ScriptedNotifier::new();
    let watcher = WatcherBuilder::new("x")
        .finder(StaticFinder::new(["."]))
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .build()
        .expect("complete watcher");
    assert_eq!(watcher.coalesce_window(), WINDOW);
    assert_eq!(watcher.state(), WatcherState::Idle);
    assert_eq!(watcher.name(), "x");

    let (notifier, _handle) = ScriptedNotifier::new();
    let err = WatcherBuilder::new("x")
        .finder(StaticFinder::new(["."]))
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .coalesce_window(Duration::ZERO)
        .build()
        .unwrap_err();
    assert!(matches!(err, WatchError::ConfigError(_)));

    let (notifier, _handle) = ScriptedNotifier::new();
    let err = WatcherBuilder::new("x")
        .finder(StaticFinder::new(["."]))
        .notifier(notifier)
        .executor(Arc::new(RecordingExecutor::new()))
        .coalesce_window(Duration::MAX)
        .build()
        .unwrap_err();
    assert!(matches!(err, WatchError::ConfigError(msg) if msg.contains("too large")));
}
