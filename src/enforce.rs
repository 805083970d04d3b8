//! Label enforcement: turn pending actions into remote label additions.
//!
//! Processing is fail-soft at per-ticket granularity: a failed label
//! application is recorded and reported, and the run moves on to the
//! next ticket. Dry-run mode records every would-be action without
//! touching the remote side.

use crate::classify::Analysis;
use crate::model::PendingAction;
use crate::report::Reporter;

/// A failed label application. Never fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Applies a label to a ticket on the remote side.
///
/// Implementations must treat "label already exists" as success; the
/// classifier avoids re-issuing labels, but a race with another run is
/// not an error worth reporting.
pub trait LabelSink {
    fn add_label(&self, ticket_id: u64, label: &str) -> Result<(), ApplyError>;
}

/// What happened to one pending action.
#[derive(Debug)]
pub struct EnforcementOutcome {
    pub action: PendingAction,
    pub status: OutcomeStatus,
}

#[derive(Debug)]
pub enum OutcomeStatus {
    Applied,
    SkippedDryRun,
    Failed(ApplyError),
}

/// Work through the analysis queues, warning queue first.
///
/// Returns one outcome per pending action, in processing order.
pub fn enforce(
    analysis: Analysis,
    dry_run: bool,
    sink: &dyn LabelSink,
    reporter: &dyn Reporter,
) -> Vec<EnforcementOutcome> {
    if analysis.is_empty() {
        reporter.no_action_required();
        return Vec::new();
    }
    reporter.modifying_tickets();

    let Analysis { warn, overdue } = analysis;
    warn.into_iter()
        .chain(overdue)
        .map(|action| apply(action, dry_run, sink, reporter))
        .collect()
}

fn apply(
    action: PendingAction,
    dry_run: bool,
    sink: &dyn LabelSink,
    reporter: &dyn Reporter,
) -> EnforcementOutcome {
    if dry_run {
        reporter.dry_run_skip(&action);
        return EnforcementOutcome {
            action,
            status: OutcomeStatus::SkippedDryRun,
        };
    }

    reporter.applying(&action);
    let status = match sink.add_label(action.ticket_id, &action.label) {
        Ok(()) => OutcomeStatus::Applied,
        Err(error) => {
            reporter.apply_failed(&action, &error);
            OutcomeStatus::Failed(error)
        }
    };
    EnforcementOutcome { action, status }
}
