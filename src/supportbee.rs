//! SupportBee API client.
//!
//! Implements the ticket listing and label application seams over a
//! company's SupportBee account. Authentication is an `auth_token`
//! query parameter on every request; the token is redacted from every
//! URL handed to the reporter.

use jiff::Timestamp;
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::enforce::{ApplyError, LabelSink};
use crate::fetch::{FetchError, TicketRepository};
use crate::model::{Target, Ticket};
use crate::report::Reporter;

const PER_PAGE: u32 = 100;

/// Blocking client for one SupportBee account.
pub struct SupportBee<'a> {
    agent: ureq::Agent,
    base: Url,
    auth_token: String,
    reporter: &'a dyn Reporter,
}

/// The configured company does not form a valid API host.
#[derive(Debug, thiserror::Error)]
#[error("invalid company subdomain {company:?}: {source}")]
pub struct InvalidCompany {
    company: String,
    source: url::ParseError,
}

/// One page of the ticket listing envelope.
#[derive(Debug, Deserialize)]
struct TicketListPage {
    tickets: Vec<Ticket>,
    total_pages: u32,
}

impl<'a> SupportBee<'a> {
    pub fn new(config: &Config, reporter: &'a dyn Reporter) -> Result<Self, InvalidCompany> {
        let base = Url::parse(&format!("https://{}.supportbee.com", config.company)).map_err(
            |source| InvalidCompany {
                company: config.company.clone(),
                source,
            },
        )?;
        Ok(Self {
            agent: ureq::AgentBuilder::new().build(),
            base,
            auth_token: config.auth_token.clone(),
            reporter,
        })
    }

    /// Lazy ticket sequence for one entity: pages are requested on
    /// demand as the iterator is consumed, ending when the envelope
    /// reports the last page.
    fn pages<'c>(&'c self, target: Target, until: Timestamp) -> TicketPages<'c, 'a> {
        TicketPages {
            client: self,
            target,
            until,
            page: 1,
            buffer: Vec::new().into_iter(),
            done: false,
        }
    }

    fn fetch_page(
        &self,
        target: Target,
        until: Timestamp,
        page: u32,
    ) -> Result<TicketListPage, FetchError> {
        let url = self.tickets_url(target, until, page);
        self.reporter.request("GET", &self.redacted(&url));

        let response = self
            .agent
            .request_url("GET", &url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(status, response) => FetchError::Http {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                other => FetchError::Transport(other.to_string()),
            })?;

        response
            .into_json()
            .map_err(|error| FetchError::Decode(error.to_string()))
    }

    fn tickets_url(&self, target: Target, until: Timestamp, page: u32) -> Url {
        let (assigned, id) = match target {
            Target::Group(id) => ("assigned_group", id),
            Target::User(id) => ("assigned_user", id),
        };

        let mut url = self.base.clone();
        url.set_path("/tickets");
        url.query_pairs_mut()
            .append_pair("auth_token", &self.auth_token)
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("page", &page.to_string())
            .append_pair(assigned, &id.to_string())
            .append_pair("until", &until.to_string());
        url
    }

    fn label_url(&self, ticket_id: u64, label: &str) -> Result<Url, ApplyError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ApplyError::Transport("API base URL cannot carry a path".to_string())
            })?;
            segments
                .pop_if_empty()
                .extend(["tickets", &ticket_id.to_string(), "labels", label]);
        }
        url.query_pairs_mut()
            .append_pair("auth_token", &self.auth_token);
        Ok(url)
    }

    fn redacted(&self, url: &Url) -> String {
        if self.auth_token.is_empty() {
            return url.to_string();
        }
        url.as_str().replace(&self.auth_token, "***")
    }
}

impl TicketRepository for SupportBee<'_> {
    fn fetch_tickets(&self, target: Target, until: Timestamp) -> Result<Vec<Ticket>, FetchError> {
        self.pages(target, until).collect()
    }
}

impl LabelSink for SupportBee<'_> {
    fn add_label(&self, ticket_id: u64, label: &str) -> Result<(), ApplyError> {
        let url = self.label_url(ticket_id, label)?;
        self.reporter.request("POST", &self.redacted(&url));

        self.agent
            .request_url("POST", &url)
            .set("Accept", "application/json")
            .set("Content-Type", "application/json")
            .call()
            .map_err(|error| match error {
                ureq::Error::Status(status, response) => ApplyError::Http {
                    status,
                    body: response.into_string().unwrap_or_default(),
                },
                other => ApplyError::Transport(other.to_string()),
            })?;

        Ok(())
    }
}

/// Iterator over one entity's tickets, buffering one page at a time.
struct TicketPages<'c, 'r> {
    client: &'c SupportBee<'r>,
    target: Target,
    until: Timestamp,
    page: u32,
    buffer: std::vec::IntoIter<Ticket>,
    done: bool,
}

impl Iterator for TicketPages<'_, '_> {
    type Item = Result<Ticket, FetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ticket) = self.buffer.next() {
                return Some(Ok(ticket));
            }
            if self.done {
                return None;
            }
            match self.client.fetch_page(self.target, self.until, self.page) {
                Ok(listing) => {
                    self.done = self.page >= listing.total_pages;
                    self.page += 1;
                    self.buffer = listing.tickets.into_iter();
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
