use clap::Subcommand;
use pawfocus_core::runtime::{self, Input, RunOptions};
use pawfocus_core::{App, Database, Event};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::print_json;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a focus session in the foreground.
    ///
    /// Type `give-up [note]`, `away`, `reset`, `start`, `status` or `quit`
    /// while it runs. Ctrl-C gives up; a second Ctrl-C quits.
    Run {
        /// Wait for `start` instead of starting right away
        #[arg(long)]
        no_auto_start: bool,
        /// Keep accepting commands after the session ends
        #[arg(long)]
        stay: bool,
    },
    /// Print current session state as JSON
    Status,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;

    match action {
        SessionAction::Run {
            no_auto_start,
            stay,
        } => {
            let options = RunOptions {
                auto_start: !no_auto_start,
                exit_on_settle: !stay,
            };
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(run_interactive(&mut app, options));
            // The stdin reader may still be parked in a blocking read.
            rt.shutdown_background();
        }
        SessionAction::Status => {
            print_json(&app.snapshot())?;
        }
    }
    Ok(())
}

async fn run_interactive(app: &mut App<Database>, options: RunOptions) {
    let (tx, rx) = mpsc::unbounded_channel();

    // Ctrl-C must not keep the channel open after stdin is gone.
    let interrupt_tx = tx.downgrade();
    tokio::spawn(async move {
        let mut first = true;
        while tokio::signal::ctrl_c().await.is_ok() {
            let Some(tx) = interrupt_tx.upgrade() else {
                std::process::exit(130);
            };
            let input = if first { Input::GiveUp(None) } else { Input::Quit };
            first = false;
            if tx.send(input).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match Input::parse(&line) {
                Some(input) => {
                    if tx.send(input).is_err() {
                        break;
                    }
                }
                None => eprintln!("unknown command: {}", line.trim()),
            }
        }
        tracing::debug!("stdin closed");
    });

    runtime::run(app, rx, options, render).await;
}

fn render(event: &Event) {
    match event {
        Event::Ticked { remaining_secs, .. } => {
            let mut stderr = std::io::stderr();
            let _ = write!(
                stderr,
                "\r{:02}:{:02} remaining ",
                remaining_secs / 60,
                remaining_secs % 60
            );
            let _ = stderr.flush();
            return;
        }
        Event::SessionCompleted {
            earned_treats,
            total_treats,
            ..
        } => {
            eprintln!("\rSession complete: +{earned_treats} treats ({total_treats} total)");
        }
        Event::SessionFailed { message, .. } => {
            eprintln!("\r{message}");
        }
        _ => {}
    }
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "could not encode event"),
    }
}
