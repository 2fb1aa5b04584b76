//! Event loop that drives an [`App`] in real time.
//!
//! One task owns the app. It waits on two sources: the input channel (user
//! actions and the visibility signal) and a one-second interval that exists
//! only while a session runs. The interval is tied to the session's clock
//! token and is dropped as soon as that token stops being live, so it can
//! never tick a session that has already ended.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::app::App;
use crate::events::Event;
use crate::session::ClockToken;
use crate::storage::KvStore;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Something that happened outside the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    GiveUp(Option<String>),
    /// The host stopped being visible.
    VisibilityLost,
    Reset,
    /// Emit a state snapshot.
    Status,
    Quit,
}

impl Input {
    /// Parse a typed command line such as `give-up stuck on email`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let note = (!rest.is_empty()).then(|| rest.to_string());
        match word.to_ascii_lowercase().as_str() {
            "start" | "s" => Some(Input::Start),
            "give-up" | "giveup" | "g" => Some(Input::GiveUp(note)),
            "away" | "hide" | "hidden" => Some(Input::VisibilityLost),
            "reset" | "r" => Some(Input::Reset),
            "status" | "?" => Some(Input::Status),
            "quit" | "exit" | "q" => Some(Input::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Start a session before reading any input.
    pub auto_start: bool,
    /// Return after the first completed or failed session.
    pub exit_on_settle: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            auto_start: true,
            exit_on_settle: true,
        }
    }
}

/// Process inputs and clock ticks until told to stop.
///
/// Returns on `Quit`, after the first terminal event when
/// `exit_on_settle` is set, or once the input channel is closed and no
/// session is running. Every event is passed to `on_event` in the order it
/// happened.
pub async fn run<S, F>(
    app: &mut App<S>,
    mut inputs: mpsc::UnboundedReceiver<Input>,
    options: RunOptions,
    mut on_event: F,
) where
    S: KvStore,
    F: FnMut(&Event),
{
    let mut ticker: Option<(ClockToken, Interval)> = None;
    let mut inputs_open = true;
    let mut settled = false;

    if options.auto_start {
        if let Some(event) = app.start() {
            on_event(&event);
        }
    }

    loop {
        sync_ticker(app, &mut ticker);

        if settled && options.exit_on_settle {
            break;
        }
        if !inputs_open && ticker.is_none() {
            break;
        }

        tokio::select! {
            token = next_tick(&mut ticker) => {
                if let Some(event) = app.tick(token) {
                    settled |= event.is_terminal();
                    on_event(&event);
                }
            }
            input = inputs.recv(), if inputs_open => {
                let Some(input) = input else {
                    tracing::debug!("input channel closed");
                    inputs_open = false;
                    continue;
                };
                let event = match input {
                    Input::Start => app.start(),
                    Input::GiveUp(note) => app.give_up(note.as_deref()),
                    Input::VisibilityLost => app.visibility_lost(),
                    Input::Reset => Some(app.reset()),
                    Input::Status => Some(app.snapshot()),
                    Input::Quit => break,
                };
                if let Some(event) = event {
                    settled |= event.is_terminal();
                    on_event(&event);
                }
            }
        }
    }
}

/// Keep the interval in step with the session's clock subscription.
fn sync_ticker<S: KvStore>(app: &App<S>, ticker: &mut Option<(ClockToken, Interval)>) {
    let live = app.session().clock_token();
    match (live, ticker.as_ref()) {
        (Some(token), Some((held, _))) if *held == token => {}
        (Some(token), _) => {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some((token, interval));
        }
        (None, _) => *ticker = None,
    }
}

async fn next_tick(ticker: &mut Option<(ClockToken, Interval)>) -> ClockToken {
    match ticker {
        Some((token, interval)) => {
            interval.tick().await;
            *token
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Input::parse("start"), Some(Input::Start));
        assert_eq!(Input::parse("  AWAY "), Some(Input::VisibilityLost));
        assert_eq!(Input::parse("give-up"), Some(Input::GiveUp(None)));
        assert_eq!(
            Input::parse("give-up dog needed a walk"),
            Some(Input::GiveUp(Some("dog needed a walk".into())))
        );
        assert_eq!(Input::parse("q"), Some(Input::Quit));
        assert_eq!(Input::parse("dance"), None);
        assert_eq!(Input::parse(""), None);
    }
}
