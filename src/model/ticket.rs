//! Ticket types, shaped after the helpdesk API payload.

use jiff::Timestamp;
use serde::Deserialize;

/// A support ticket as returned by the listing endpoint.
///
/// Read-only within the enforcer: classification never mutates a ticket,
/// and label changes happen remotely.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,

    /// Tickets that have been answered never match any rule.
    #[serde(default)]
    pub unanswered: bool,

    pub last_activity_at: Timestamp,

    #[serde(default)]
    pub labels: Vec<Label>,
}

/// A label on a ticket. The API wraps each name in an object.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

impl Ticket {
    /// Whether the ticket currently carries a label with this name.
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label.name == name)
    }
}
