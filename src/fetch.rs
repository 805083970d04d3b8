//! Ticket supply: the repository seam and the pre-fetch watermark step.
//!
//! Each matcher implies an earliest instant it cares about; those are
//! aggregated per entity so one listing call per entity covers every
//! rule targeting it. The repository itself is a seam — the core only
//! needs "all tickets for this entity with activity before X".

use std::collections::BTreeMap;

use jiff::Timestamp;

use crate::model::{Matcher, Target, Ticket};
use crate::report::Reporter;

/// A failed ticket listing.
///
/// Fatal for the run: classifying against a partial ticket set could
/// silently suppress real SLA violations, so the orchestrator aborts.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("ticket listing failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("ticket listing transport failure: {0}")]
    Transport(String),

    #[error("could not decode ticket listing: {0}")]
    Decode(String),
}

/// Supplies tickets assigned to an entity with activity on or before a
/// watermark. Implementations own pagination and transport; an empty
/// result is an empty vec, never an error.
pub trait TicketRepository {
    fn fetch_tickets(&self, target: Target, until: Timestamp) -> Result<Vec<Ticket>, FetchError>;
}

/// The fetch watermark per entity: the MIN (earliest) of every threshold
/// any matcher targeting that entity defines.
///
/// The listing endpoint filters by "activity before X", so the earliest
/// bound is the most inclusive one; anything later would under-fetch and
/// hide violations from matchers with earlier thresholds.
pub fn fetch_watermarks(matchers: &[Matcher]) -> BTreeMap<Target, Timestamp> {
    let mut watermarks = BTreeMap::new();
    for matcher in matchers {
        let watermark = matcher.fetch_watermark();
        watermarks
            .entry(matcher.target)
            .and_modify(|current: &mut Timestamp| *current = (*current).min(watermark))
            .or_insert(watermark);
    }
    watermarks
}

/// Tickets fetched for a run, grouped by the entity they belong to.
#[derive(Debug)]
pub struct GroupedTickets {
    by_target: BTreeMap<Target, Vec<Ticket>>,
}

impl GroupedTickets {
    /// Fetch every entity's tickets up front, in entity order.
    ///
    /// The first listing failure aborts the whole fetch.
    pub fn fetch_all(
        repo: &dyn TicketRepository,
        watermarks: &BTreeMap<Target, Timestamp>,
        reporter: &dyn Reporter,
    ) -> Result<Self, FetchError> {
        let mut by_target = BTreeMap::new();
        for (&target, &until) in watermarks {
            reporter.fetching(target, until);
            let tickets = repo.fetch_tickets(target, until)?;
            reporter.tickets_fetched(tickets.len());
            by_target.insert(target, tickets);
        }
        Ok(Self { by_target })
    }

    /// Tickets for one entity; empty for entities never fetched.
    pub fn for_target(&self, target: Target) -> &[Ticket] {
        self.by_target.get(&target).map_or(&[], Vec::as_slice)
    }
}

impl FromIterator<(Target, Vec<Ticket>)> for GroupedTickets {
    fn from_iter<I: IntoIterator<Item = (Target, Vec<Ticket>)>>(iter: I) -> Self {
        Self {
            by_target: iter.into_iter().collect(),
        }
    }
}
