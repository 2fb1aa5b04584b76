use clap::Args;
use pawfocus_core::{format_cents, App, BrowserHandoff, Shelter};
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct DonateArgs {
    /// Record the donation without asking
    #[arg(long, short)]
    yes: bool,
}

pub fn run(args: DonateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open()?;
    let mut handoff = BrowserHandoff::new(|shelter: &Shelter, cents: u64| {
        args.yes || ask(shelter, cents)
    });

    match app.donate(&mut handoff)? {
        Some(event) => {
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        None => eprintln!("donation not recorded"),
    }
    Ok(())
}

fn ask(shelter: &Shelter, cents: u64) -> bool {
    eprint!(
        "Donate {} to {} at {}\nDid you complete the donation? [y/N] ",
        format_cents(cents),
        shelter.name,
        shelter.url
    );
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
