//! Matcher types: a configured SLA rule.

use std::fmt;

use jiff::Timestamp;

/// Label applied when a ticket crosses the warning threshold.
pub const DEFAULT_WARN_LABEL: &str = "respond now";

/// Label applied when a ticket crosses the overdue threshold.
pub const DEFAULT_OVERDUE_LABEL: &str = "overdue";

/// A validated SLA rule binding one entity to label conditions
/// and time thresholds.
///
/// Built once by config validation and immutable afterwards.
/// Thresholds are absolute instants, resolved against a single "now"
/// so every ticket in a run is judged against the same cutoffs.
#[derive(Debug, Clone)]
pub struct Matcher {
    /// Rule name, used in output only.
    pub name: String,

    /// The entity whose tickets this rule applies to.
    pub target: Target,

    /// Labels that must all be present for the rule to apply.
    pub has_label: Vec<String>,

    /// Labels that must all be absent for the rule to apply.
    pub has_no_label: Vec<String>,

    /// Tickets with activity before this instant deserve a warning.
    /// Rules without a warning tier leave this unset.
    pub warn_threshold: Option<Timestamp>,

    /// Tickets with activity before this instant are overdue.
    pub overdue_threshold: Timestamp,

    pub warn_label: String,
    pub overdue_label: String,
}

impl Matcher {
    /// The earliest instant this rule cares about.
    ///
    /// Used as the server-side fetch bound: the listing endpoint filters
    /// by "activity before X", so the earliest threshold yields a superset
    /// of every ticket this rule might flag.
    pub fn fetch_watermark(&self) -> Timestamp {
        match self.warn_threshold {
            Some(warn) => warn.min(self.overdue_threshold),
            None => self.overdue_threshold,
        }
    }
}

/// The entity a matcher targets: a support group or an individual agent.
///
/// Exactly one of the two, enforced at construction — downstream code
/// never sees a rule with neither or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    Group(u64),
    User(u64),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}
