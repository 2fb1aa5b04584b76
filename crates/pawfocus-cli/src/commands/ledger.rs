use clap::Subcommand;
use pawfocus_core::App;

use super::print_json;

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Treats, pledge and donation totals
    Show,
    /// Finished sessions, newest first
    History {
        /// Only show the newest N sessions
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: LedgerAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::open()?;

    match action {
        LedgerAction::Show => {
            print_json(&app.summary())?;
        }
        LedgerAction::History { limit } => {
            let entries: Vec<_> = app
                .ledger()
                .recent(limit.unwrap_or(usize::MAX))
                .collect();
            print_json(&entries)?;
        }
    }
    Ok(())
}
