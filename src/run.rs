//! Run orchestration: rules to fetches to verdicts to labels.

use crate::classify;
use crate::config::Config;
use crate::enforce::{self, EnforcementOutcome, LabelSink, OutcomeStatus};
use crate::fetch::{FetchError, GroupedTickets, TicketRepository, fetch_watermarks};
use crate::model::LabelKind;
use crate::report::Reporter;

/// Counts of what a run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub warned: usize,
    pub marked_overdue: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Execute one full enforcement run.
///
/// A fetch failure aborts before any classification; enforcement
/// failures are counted in the summary but never abort.
pub fn run(
    config: &Config,
    repo: &dyn TicketRepository,
    sink: &dyn LabelSink,
    reporter: &dyn Reporter,
) -> Result<RunSummary, FetchError> {
    let watermarks = fetch_watermarks(&config.matchers);
    let tickets = GroupedTickets::fetch_all(repo, &watermarks, reporter)?;
    let analysis = classify::analyze(&config.matchers, &tickets, reporter);
    let outcomes = enforce::enforce(analysis, config.dry_run, sink, reporter);
    Ok(summarize(&outcomes))
}

fn summarize(outcomes: &[EnforcementOutcome]) -> RunSummary {
    let mut summary = RunSummary::default();
    for outcome in outcomes {
        match &outcome.status {
            OutcomeStatus::Applied => match outcome.action.kind {
                LabelKind::Warn => summary.warned += 1,
                LabelKind::Overdue => summary.marked_overdue += 1,
            },
            OutcomeStatus::SkippedDryRun => summary.skipped += 1,
            OutcomeStatus::Failed(_) => summary.failed += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use jiff::Timestamp;

    use crate::enforce::ApplyError;
    use crate::model::{
        DEFAULT_OVERDUE_LABEL, DEFAULT_WARN_LABEL, Label, Matcher, Target, Ticket,
    };
    use crate::report::NullReporter;

    const NOW: &str = "2024-01-08T12:00:00Z";

    fn timestamp(text: &str) -> Timestamp {
        text.parse().unwrap()
    }

    fn hours_before_now(hours: i64) -> Timestamp {
        timestamp(NOW)
            .checked_sub(jiff::Span::new().hours(hours))
            .unwrap()
    }

    fn sample_config(dry_run: bool) -> Config {
        Config {
            auth_token: "secret".into(),
            company: "acme".into(),
            dry_run,
            matchers: vec![Matcher {
                name: "support".into(),
                target: Target::Group(1),
                has_label: vec![],
                has_no_label: vec![],
                warn_threshold: Some(hours_before_now(24)),
                overdue_threshold: hours_before_now(48),
                warn_label: DEFAULT_WARN_LABEL.into(),
                overdue_label: DEFAULT_OVERDUE_LABEL.into(),
            }],
        }
    }

    fn ticket(id: u64, hours_quiet: i64, labels: &[&str]) -> Ticket {
        Ticket {
            id,
            subject: format!("Ticket {id}"),
            unanswered: true,
            last_activity_at: hours_before_now(hours_quiet),
            labels: labels
                .iter()
                .map(|name| Label {
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    struct FakeRepo {
        tickets: Vec<Ticket>,
        fail: bool,
    }

    impl TicketRepository for FakeRepo {
        fn fetch_tickets(
            &self,
            _target: Target,
            _until: Timestamp,
        ) -> Result<Vec<Ticket>, FetchError> {
            if self.fail {
                return Err(FetchError::Transport("connection refused".into()));
            }
            Ok(self.tickets.clone())
        }
    }

    struct FakeSink {
        calls: RefCell<Vec<(u64, String)>>,
        fail_for: Option<u64>,
    }

    impl FakeSink {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_for: None,
            }
        }
    }

    impl LabelSink for FakeSink {
        fn add_label(&self, ticket_id: u64, label: &str) -> Result<(), ApplyError> {
            self.calls.borrow_mut().push((ticket_id, label.to_string()));
            if self.fail_for == Some(ticket_id) {
                return Err(ApplyError::Http {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn a_full_run_labels_the_right_tickets() {
        let config = sample_config(false);
        let repo = FakeRepo {
            tickets: vec![
                ticket(1, 72, &[]),
                ticket(2, 36, &[]),
                ticket(3, 12, &[]),
            ],
            fail: false,
        };
        let sink = FakeSink::new();

        let summary = run(&config, &repo, &sink, &NullReporter).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                warned: 1,
                marked_overdue: 1,
                skipped: 0,
                failed: 0
            }
        );
        let calls = sink.calls.borrow();
        assert_eq!(
            calls.as_slice(),
            [(2, "respond now".to_string()), (1, "overdue".to_string())]
        );
    }

    #[test]
    fn already_labeled_tickets_are_left_alone() {
        // Running the enforcer against its own previous output produces
        // no further actions.
        let config = sample_config(false);
        let repo = FakeRepo {
            tickets: vec![ticket(1, 72, &["overdue"]), ticket(2, 36, &["respond now"])],
            fail: false,
        };
        let sink = FakeSink::new();

        let summary = run(&config, &repo, &sink, &NullReporter).unwrap();

        assert_eq!(summary, RunSummary::default());
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn dry_run_counts_skips_instead_of_calls() {
        let config = sample_config(true);
        let repo = FakeRepo {
            tickets: vec![ticket(1, 72, &[]), ticket(2, 36, &[])],
            fail: false,
        };
        let sink = FakeSink::new();

        let summary = run(&config, &repo, &sink, &NullReporter).unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.warned + summary.marked_overdue + summary.failed, 0);
        assert!(sink.calls.borrow().is_empty());
    }

    #[test]
    fn label_failures_are_counted_not_fatal() {
        let config = sample_config(false);
        let repo = FakeRepo {
            tickets: vec![ticket(1, 72, &[]), ticket(2, 72, &[])],
            fail: false,
        };
        let sink = FakeSink {
            fail_for: Some(1),
            ..FakeSink::new()
        };

        let summary = run(&config, &repo, &sink, &NullReporter).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.marked_overdue, 1);
    }

    #[test]
    fn fetch_failure_aborts_the_run() {
        let config = sample_config(false);
        let repo = FakeRepo {
            tickets: vec![],
            fail: true,
        };
        let sink = FakeSink::new();

        let err = run(&config, &repo, &sink, &NullReporter).unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(sink.calls.borrow().is_empty());
    }
}
