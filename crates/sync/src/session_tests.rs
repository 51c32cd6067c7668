// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Prowl Contributors

use super::*;
use std::sync::atomic::AtomicUsize;

#[derive(Debug, Clone)]
struct Tick {
    pass: u64,
    valid: bool,
    idle: bool,
}

impl PassOutcome for Tick {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn is_idle(&self) -> bool {
        self.idle
    }
}

struct Ticker {
    invocations: AtomicUsize,
    valid: bool,
    idle: bool,
}

impl Ticker {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            invocations: AtomicUsize::new(0),
            valid: true,
            idle: false,
        })
    }

    fn reporting(valid: bool, idle: bool) -> Arc<Self> {
        Arc::new(Self {
            invocations: AtomicUsize::new(0),
            valid,
            idle,
        })
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PassHandler<Tick> for Ticker {
    async fn pass(&self, _token: CancellationToken, session: Arc<Session<Tick>>) -> Tick {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Tick {
            pass: session.pass(),
            valid: self.valid,
            idle: self.idle,
        }
    }
}

fn one_second() -> SessionSettings {
    SessionSettings::with_interval(Duration::from_secs(1))
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn start_rejects_short_interval() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let settings = SessionSettings::with_interval(Duration::from_millis(500));

    let err = Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), settings)
        .unwrap_err();
    assert_eq!(err, SessionError::InvalidInterval);
    assert!(!session.active());
}

#[tokio::test(start_paused = true)]
async fn start_rejects_while_active() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();

    let err = Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap_err();
    assert_eq!(err, SessionError::AlreadyActive);

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn passes_tick_and_broadcast_in_order() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();
    let mut listener = session.listen();

    for expected in 0..3u64 {
        let tick = listener.recv().await.unwrap();
        assert_eq!(tick.pass, expected);
    }

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn paused_session_does_not_tick() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let ticker = Ticker::new();
    let mut settings = one_second();
    settings.paused = true;

    Arc::clone(&session)
        .start(CancellationToken::new(), Arc::clone(&ticker), settings)
        .unwrap();
    assert!(session.paused());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ticker.invocations(), 0);

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn resume_triggers_prompt_pass() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let mut settings = one_second();
    settings.paused = true;

    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), settings)
        .unwrap();
    let mut listener = session.listen();

    session.resume();
    assert!(!session.paused());
    assert!(listener.recv().await.is_some());

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn immediate_while_paused_does_not_tick() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let ticker = Ticker::new();
    let mut settings = one_second();
    settings.paused = true;

    Arc::clone(&session)
        .start(CancellationToken::new(), Arc::clone(&ticker), settings)
        .unwrap();

    assert!(session.immediate(Duration::ZERO).await);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(ticker.invocations(), 0);

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn immediate_reschedules_next_tick() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();
    let mut listener = session.listen();

    assert!(listener.recv().await.is_some());
    assert!(session.immediate(Duration::ZERO).await);
    assert!(listener.recv().await.is_some());

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn immediate_when_inactive_reports_failure() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    assert!(!session.immediate(Duration::ZERO).await);
}

#[tokio::test(start_paused = true)]
async fn stop_handshake_completes() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();

    assert!(session.stop().await);
    assert!(!session.active());
    assert!(!session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn listener_after_stop_is_born_closed() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();
    assert!(session.stop().await);

    let mut listener = session.listen();
    assert_eq!(listener.recv().await.map(|t| t.pass), None);
}

#[tokio::test(start_paused = true)]
async fn cancellation_tears_the_loop_down() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let token = CancellationToken::new();
    Arc::clone(&session)
        .start(token.clone(), Ticker::new(), one_second())
        .unwrap();
    let mut listener = session.listen();

    token.cancel();

    // The broadcaster is discarded at halt, which closes the listener.
    while listener.recv().await.is_some() {}
    assert!(!session.active());
}

#[tokio::test(start_paused = true)]
async fn pause_idle_pauses_after_idle_result() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let ticker = Ticker::reporting(true, true);
    let mut settings = one_second();
    settings.pause_idle = true;

    Arc::clone(&session)
        .start(CancellationToken::new(), Arc::clone(&ticker), settings)
        .unwrap();
    let mut listener = session.listen();

    assert!(listener.recv().await.unwrap().idle);
    settle().await;
    assert!(session.paused());
    assert_eq!(session.pass(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(ticker.invocations(), 1);

    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn invalid_results_are_dropped_silently() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let ticker = Ticker::reporting(false, false);

    Arc::clone(&session)
        .start(CancellationToken::new(), Arc::clone(&ticker), one_second())
        .unwrap();
    let mut listener = session.listen();

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(ticker.invocations() > 0);
    assert_eq!(session.pass(), 0);
    assert!(listener.try_recv().is_none());

    assert!(session.stop().await);
}

struct Hanging;

#[async_trait]
impl PassHandler<Tick> for Hanging {
    async fn pass(&self, token: CancellationToken, session: Arc<Session<Tick>>) -> Tick {
        // Ignores the interval and only yields once cancelled.
        token.cancelled().await;
        Tick {
            pass: session.pass(),
            valid: true,
            idle: false,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn watchdog_cancels_overrunning_pass() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    let mut settings = one_second();
    settings.single_pass_timeout = Duration::from_secs(5);

    Arc::clone(&session)
        .start(CancellationToken::new(), Arc::new(Hanging), settings)
        .unwrap();
    let mut listener = session.listen();

    // The pass only completes because the watchdog cancels its token.
    assert!(listener.recv().await.is_some());
    assert!(session.stop().await);
}

#[tokio::test(start_paused = true)]
async fn restart_resets_pass_counter() {
    let session: Arc<Session<Tick>> = Arc::new(Session::new());
    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();
    let mut listener = session.listen();
    assert!(listener.recv().await.is_some());
    assert!(session.stop().await);

    Arc::clone(&session)
        .start(CancellationToken::new(), Ticker::new(), one_second())
        .unwrap();
    assert!(session.active());
    assert_eq!(session.pass(), 0);
    assert!(!session.id().is_empty());
    assert!(session.stop().await);
}
