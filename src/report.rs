//! Decision-event reporting.
//!
//! The core emits structured events through the [`Reporter`] seam and
//! never formats output itself. The console implementation renders the
//! events in the terse indented style the tool has always printed;
//! every method has a no-op default so test doubles implement nothing.

use jiff::Timestamp;

use crate::enforce::ApplyError;
use crate::model::{PendingAction, Target, Ticket, Verdict};

/// Receives decision events as a run progresses.
pub trait Reporter {
    /// A ticket listing for one entity is starting.
    fn fetching(&self, _target: Target, _until: Timestamp) {}

    /// An HTTP request is being issued. The URL is already redacted.
    fn request(&self, _method: &str, _url: &str) {}

    /// One entity's listing finished with this many tickets.
    fn tickets_fetched(&self, _count: usize) {}

    /// Classification with the named matcher is starting.
    fn matcher_started(&self, _name: &str) {}

    /// A matcher evaluated a ticket.
    fn ticket_verdict(&self, _ticket: &Ticket, _verdict: Verdict) {}

    /// The matcher applied to none of its entity's tickets.
    fn no_matching_tickets(&self) {}

    /// Classification produced no pending actions.
    fn no_action_required(&self) {}

    /// Enforcement of the pending actions is starting.
    fn modifying_tickets(&self) {}

    /// A label application is being issued.
    fn applying(&self, _action: &PendingAction) {}

    /// Dry-run mode suppressed a label application.
    fn dry_run_skip(&self, _action: &PendingAction) {}

    /// A label application failed; the run continues.
    fn apply_failed(&self, _action: &PendingAction, _error: &ApplyError) {}
}

/// Discards every event. Useful wherever output is unwanted.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Prints events to stdout, failures to stderr.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn fetching(&self, target: Target, until: Timestamp) {
        println!("Fetching tickets for {target} (activity until {until})");
    }

    fn request(&self, method: &str, url: &str) {
        println!(" --> {method} {url}");
    }

    fn tickets_fetched(&self, count: usize) {
        println!("     {count} ticket(s) fetched");
    }

    fn matcher_started(&self, name: &str) {
        println!("Analyzing with matcher: {name}");
    }

    fn ticket_verdict(&self, ticket: &Ticket, verdict: Verdict) {
        match verdict {
            Verdict::NeedsOverdue => {
                println!("     Ticket {} is overdue: {}", ticket.id, ticket.subject);
            }
            Verdict::AlreadyOverdue => {
                println!(
                    "     Ticket {} is overdue, but already has the overdue label: {}",
                    ticket.id, ticket.subject
                );
            }
            Verdict::NeedsWarning => {
                println!(
                    "     Ticket {} deserves a warning: {}",
                    ticket.id, ticket.subject
                );
            }
            Verdict::AlreadyWarned => {
                println!(
                    "     Ticket {} deserves a warning, but already has the warning label: {}",
                    ticket.id, ticket.subject
                );
            }
            Verdict::NoMatch => {}
        }
    }

    fn no_matching_tickets(&self) {
        println!("     No matching tickets found");
    }

    fn no_action_required(&self) {
        println!("No action required");
    }

    fn modifying_tickets(&self) {
        println!("Modifying tickets");
    }

    fn applying(&self, action: &PendingAction) {
        println!(
            " --> Adding label {:?} on ticket {}: {}",
            action.label, action.ticket_id, action.subject
        );
    }

    fn dry_run_skip(&self, action: &PendingAction) {
        println!(
            "     Dry running, not adding label {:?} on ticket {}: {}",
            action.label, action.ticket_id, action.subject
        );
    }

    fn apply_failed(&self, action: &PendingAction, error: &ApplyError) {
        eprintln!(
            "     Adding label {:?} on ticket {} failed: {error}",
            action.label, action.ticket_id
        );
    }
}
