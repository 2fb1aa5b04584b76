//! Runtime loop tests on tokio's paused clock.

use pawfocus_core::runtime::{self, Input, RunOptions};
use pawfocus_core::{App, Event, MemoryStore, SessionStatus};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

fn app(duration_secs: u64, strict_mode: bool) -> App<MemoryStore> {
    let mut app = App::load(MemoryStore::new());
    app.update_config(|cfg| {
        cfg.duration_secs = duration_secs;
        cfg.strict_mode = strict_mode;
        Ok(())
    })
    .unwrap();
    app.reset();
    app
}

fn kinds(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .map(|e| match e {
            Event::SessionStarted { .. } => "started",
            Event::Ticked { .. } => "ticked",
            Event::SessionCompleted { .. } => "completed",
            Event::SessionFailed { .. } => "failed",
            Event::SessionReset { .. } => "reset",
            Event::DonationRecorded { .. } => "donated",
            Event::StateSnapshot { .. } => "snapshot",
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn session_runs_to_completion_one_tick_per_second() {
    let mut app = app(3, false);
    let (_tx, rx) = mpsc::unbounded_channel();
    let mut events = Vec::new();

    let began = Instant::now();
    runtime::run(&mut app, rx, RunOptions::default(), |e| events.push(e.clone())).await;

    assert_eq!(
        kinds(&events),
        vec!["started", "ticked", "ticked", "completed"]
    );
    let elapsed = began.elapsed();
    assert!(elapsed >= Duration::from_secs(3), "finished early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "finished late: {elapsed:?}");
    assert_eq!(app.session().status(), SessionStatus::Done);
    assert_eq!(app.ledger().treats(), 1);
}

#[tokio::test(start_paused = true)]
async fn give_up_mid_session_records_elapsed() {
    let mut app = app(10, false);
    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = Vec::new();

    let script = async move {
        sleep(Duration::from_millis(2500)).await;
        tx.send(Input::GiveUp(Some("doorbell".into()))).unwrap();
    };
    tokio::join!(
        runtime::run(&mut app, rx, RunOptions::default(), |e| events.push(e.clone())),
        script
    );

    assert_eq!(kinds(&events), vec!["started", "ticked", "ticked", "failed"]);
    assert_eq!(app.session().message(), "doorbell");
    assert_eq!(app.ledger().history()[0].duration_secs, 2);
    assert_eq!(app.ledger().treats(), 0);
}

#[tokio::test(start_paused = true)]
async fn strict_visibility_loss_ends_the_loop() {
    let mut app = app(10, true);
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Input::VisibilityLost).unwrap();
    let mut events = Vec::new();

    runtime::run(&mut app, rx, RunOptions::default(), |e| events.push(e.clone())).await;

    assert_eq!(kinds(&events), vec!["started", "failed"]);
    assert_eq!(app.session().status(), SessionStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn lenient_visibility_loss_is_ignored() {
    let mut app = app(2, false);
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Input::VisibilityLost).unwrap();
    let mut events = Vec::new();

    runtime::run(&mut app, rx, RunOptions::default(), |e| events.push(e.clone())).await;

    assert_eq!(kinds(&events), vec!["started", "ticked", "completed"]);
}

#[tokio::test(start_paused = true)]
async fn quit_abandons_without_recording() {
    let mut app = app(10, false);
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Input::Quit).unwrap();

    runtime::run(&mut app, rx, RunOptions::default(), |_| {}).await;

    assert_eq!(app.session().status(), SessionStatus::Running);
    assert!(app.ledger().history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn closed_input_without_session_returns_immediately() {
    let mut app = app(10, false);
    let (tx, rx) = mpsc::unbounded_channel::<Input>();
    drop(tx);
    let options = RunOptions {
        auto_start: false,
        exit_on_settle: true,
    };
    let mut events = Vec::new();

    let began = Instant::now();
    runtime::run(&mut app, rx, options, |e| events.push(e.clone())).await;

    assert!(events.is_empty());
    assert_eq!(began.elapsed(), Duration::ZERO);
    assert_eq!(app.session().status(), SessionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn closed_input_lets_running_session_finish() {
    let mut app = app(2, false);
    let (tx, rx) = mpsc::unbounded_channel::<Input>();
    drop(tx);
    let options = RunOptions {
        auto_start: true,
        exit_on_settle: false,
    };

    runtime::run(&mut app, rx, options, |_| {}).await;

    assert_eq!(app.session().status(), SessionStatus::Done);
    assert_eq!(app.ledger().treats(), 1);
}

#[tokio::test(start_paused = true)]
async fn staying_open_runs_back_to_back_sessions() {
    let mut app = app(1, false);
    let (tx, rx) = mpsc::unbounded_channel();
    let options = RunOptions {
        auto_start: true,
        exit_on_settle: false,
    };
    let mut events = Vec::new();

    let script = async move {
        sleep(Duration::from_millis(1500)).await;
        tx.send(Input::Start).unwrap();
        tx.send(Input::Reset).unwrap();
        tx.send(Input::Start).unwrap();
        sleep(Duration::from_millis(1500)).await;
        tx.send(Input::Status).unwrap();
    };
    tokio::join!(
        runtime::run(&mut app, rx, options, |e| events.push(e.clone())),
        script
    );

    assert_eq!(
        kinds(&events),
        vec!["started", "completed", "reset", "started", "completed", "snapshot"]
    );
    assert_eq!(app.ledger().treats(), 2);
    assert_eq!(app.ledger().history().len(), 2);
}
