//! Donation recorder.
//!
//! Donating happens out of band: the user is sent to the shelter's page and
//! then asked whether they paid. A "yes" is taken at face value and the whole
//! outstanding pledge is marked as donated.

use serde::{Deserialize, Serialize};

use crate::error::DonationError;
use crate::storage::Shelter;

/// The user-facing half of a donation.
pub trait DonationHandoff {
    /// Send the user to the shelter's donation page.
    ///
    /// # Errors
    /// Returns an error if the page could not be opened. The recorder logs it
    /// and still asks for confirmation.
    fn open(&mut self, shelter: &Shelter) -> std::io::Result<()>;

    /// Ask whether `cents` were donated to `shelter`.
    fn confirm(&mut self, shelter: &Shelter, cents: u64) -> bool;
}

/// Outcome of a hand-off that passed the precondition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DonationOutcome {
    /// The user confirmed; this many cents move to donated.
    Confirmed { cents: u64 },
    Declined,
}

/// Check preconditions, hand off, and ask for confirmation.
///
/// Pure with respect to the ledger: the caller applies a
/// [`DonationOutcome::Confirmed`].
///
/// # Errors
/// `ShelterNotConfigured` when the shelter URL is blank or the placeholder,
/// `NothingToDonate` when nothing is outstanding. The hand-off is not touched
/// in either case.
pub fn donate_now(
    shelter: &Shelter,
    outstanding_cents: u64,
    handoff: &mut impl DonationHandoff,
) -> Result<DonationOutcome, DonationError> {
    if !shelter.has_donation_url() {
        return Err(DonationError::ShelterNotConfigured);
    }
    if outstanding_cents == 0 {
        return Err(DonationError::NothingToDonate);
    }

    if let Err(e) = handoff.open(shelter) {
        tracing::warn!(url = %shelter.url, error = %e, "could not open donation page");
    }

    if handoff.confirm(shelter, outstanding_cents) {
        Ok(DonationOutcome::Confirmed {
            cents: outstanding_cents,
        })
    } else {
        tracing::info!(cents = outstanding_cents, "donation not confirmed");
        Ok(DonationOutcome::Declined)
    }
}

/// Opens the page in the default browser via the `open` crate. Confirmation
/// is delegated to a closure so callers choose how to prompt.
pub struct BrowserHandoff<F> {
    confirm: F,
}

impl<F> BrowserHandoff<F>
where
    F: FnMut(&Shelter, u64) -> bool,
{
    pub fn new(confirm: F) -> Self {
        Self { confirm }
    }
}

impl<F> DonationHandoff for BrowserHandoff<F>
where
    F: FnMut(&Shelter, u64) -> bool,
{
    fn open(&mut self, shelter: &Shelter) -> std::io::Result<()> {
        open::that(shelter.url.trim())
    }

    fn confirm(&mut self, shelter: &Shelter, cents: u64) -> bool {
        (self.confirm)(shelter, cents)
    }
}

/// Format cents as dollars, e.g. `1234` -> `$12.34`.
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted hand-off that records what it was asked.
    struct Scripted {
        answer: bool,
        opened: Vec<String>,
        asked: Vec<u64>,
        open_fails: bool,
    }

    impl Scripted {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                opened: Vec::new(),
                asked: Vec::new(),
                open_fails: false,
            }
        }
    }

    impl DonationHandoff for Scripted {
        fn open(&mut self, shelter: &Shelter) -> std::io::Result<()> {
            self.opened.push(shelter.url.clone());
            if self.open_fails {
                return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"));
            }
            Ok(())
        }

        fn confirm(&mut self, _shelter: &Shelter, cents: u64) -> bool {
            self.asked.push(cents);
            self.answer
        }
    }

    fn shelter() -> Shelter {
        Shelter {
            name: "Happy Tails".into(),
            url: "https://happytails.example/give".into(),
        }
    }

    #[test]
    fn placeholder_url_is_rejected_before_handoff() {
        let mut handoff = Scripted::answering(true);
        let err = donate_now(&Shelter::default(), 500, &mut handoff).unwrap_err();
        assert_eq!(err, DonationError::ShelterNotConfigured);
        assert!(handoff.opened.is_empty());
    }

    #[test]
    fn empty_url_is_rejected() {
        let mut handoff = Scripted::answering(true);
        let shelter = Shelter {
            name: "x".into(),
            url: String::new(),
        };
        assert_eq!(
            donate_now(&shelter, 500, &mut handoff),
            Err(DonationError::ShelterNotConfigured)
        );
    }

    #[test]
    fn nothing_outstanding_is_rejected() {
        let mut handoff = Scripted::answering(true);
        assert_eq!(
            donate_now(&shelter(), 0, &mut handoff),
            Err(DonationError::NothingToDonate)
        );
        assert!(handoff.asked.is_empty());
    }

    #[test]
    fn confirmed_donation_covers_outstanding() {
        let mut handoff = Scripted::answering(true);
        let outcome = donate_now(&shelter(), 375, &mut handoff).unwrap();
        assert_eq!(outcome, DonationOutcome::Confirmed { cents: 375 });
        assert_eq!(handoff.opened, vec!["https://happytails.example/give"]);
        assert_eq!(handoff.asked, vec![375]);
    }

    #[test]
    fn declined_donation_is_not_an_error() {
        let mut handoff = Scripted::answering(false);
        assert_eq!(
            donate_now(&shelter(), 375, &mut handoff),
            Ok(DonationOutcome::Declined)
        );
    }

    #[test]
    fn browser_failure_still_asks() {
        let mut handoff = Scripted::answering(true);
        handoff.open_fails = true;
        let outcome = donate_now(&shelter(), 100, &mut handoff).unwrap();
        assert_eq!(outcome, DonationOutcome::Confirmed { cents: 100 });
    }

    #[test]
    fn formats_cents() {
        assert_eq!(format_cents(0), "$0.00");
        assert_eq!(format_cents(5), "$0.05");
        assert_eq!(format_cents(1234), "$12.34");
    }
}
