//! Ticket classification against the rule set.
//!
//! Pure decision logic: one matcher and one ticket in, one verdict out.
//! The analysis pass runs every matcher over its entity's tickets and
//! collects the verdicts that require action into warn/overdue queues.

use crate::fetch::GroupedTickets;
use crate::model::{LabelKind, Matcher, PendingAction, Ticket, Verdict};
use crate::report::Reporter;

/// Evaluate one matcher against one ticket.
///
/// Answered tickets and tickets failing the label conditions never
/// match. The overdue check strictly precedes the warning check: a
/// ticket past both thresholds is only ever overdue. Comparisons are
/// strict, so activity exactly at a threshold is not yet a violation.
pub fn classify(matcher: &Matcher, ticket: &Ticket) -> Verdict {
    if !ticket.unanswered {
        return Verdict::NoMatch;
    }
    if !matcher.has_label.iter().all(|label| ticket.has_label(label)) {
        return Verdict::NoMatch;
    }
    if matcher
        .has_no_label
        .iter()
        .any(|label| ticket.has_label(label))
    {
        return Verdict::NoMatch;
    }

    if ticket.last_activity_at < matcher.overdue_threshold {
        return if ticket.has_label(&matcher.overdue_label) {
            Verdict::AlreadyOverdue
        } else {
            Verdict::NeedsOverdue
        };
    }

    if let Some(warn_threshold) = matcher.warn_threshold
        && ticket.last_activity_at < warn_threshold
    {
        return if ticket.has_label(&matcher.warn_label) {
            Verdict::AlreadyWarned
        } else {
            Verdict::NeedsWarning
        };
    }

    Verdict::NoMatch
}

/// The actionable result of a classification pass: tickets that need
/// the warning label and tickets that need the overdue label.
///
/// Disjoint by construction, since one (matcher, ticket) pair yields at
/// most one verdict.
pub struct Analysis {
    pub warn: Vec<PendingAction>,
    pub overdue: Vec<PendingAction>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.warn.is_empty() && self.overdue.is_empty()
    }
}

/// Run every matcher over its entity's tickets, in config order.
pub fn analyze(
    matchers: &[Matcher],
    tickets: &GroupedTickets,
    reporter: &dyn Reporter,
) -> Analysis {
    let mut analysis = Analysis {
        warn: Vec::new(),
        overdue: Vec::new(),
    };

    for matcher in matchers {
        reporter.matcher_started(&matcher.name);
        let mut matched = false;

        for ticket in tickets.for_target(matcher.target) {
            let verdict = classify(matcher, ticket);
            matched |= verdict.matched();
            reporter.ticket_verdict(ticket, verdict);
            match verdict {
                Verdict::NeedsWarning => {
                    analysis.warn.push(pending(matcher, ticket, LabelKind::Warn));
                }
                Verdict::NeedsOverdue => {
                    analysis
                        .overdue
                        .push(pending(matcher, ticket, LabelKind::Overdue));
                }
                _ => {}
            }
        }

        if !matched {
            reporter.no_matching_tickets();
        }
    }

    analysis
}

fn pending(matcher: &Matcher, ticket: &Ticket, kind: LabelKind) -> PendingAction {
    let label = match kind {
        LabelKind::Warn => matcher.warn_label.clone(),
        LabelKind::Overdue => matcher.overdue_label.clone(),
    };
    PendingAction {
        matcher: matcher.name.clone(),
        ticket_id: ticket.id,
        subject: ticket.subject.clone(),
        label,
        kind,
    }
}
