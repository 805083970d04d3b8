//! Core data model for the enforcer.
//!
//! These types represent the conceptual pipeline:
//! matchers classify tickets into verdicts, verdicts become pending
//! label actions, and the enforcer turns those into remote calls.

mod matcher;
mod ticket;
mod verdict;

pub use matcher::{DEFAULT_OVERDUE_LABEL, DEFAULT_WARN_LABEL, Matcher, Target};
pub use ticket::{Label, Ticket};
pub use verdict::{LabelKind, PendingAction, Verdict};
