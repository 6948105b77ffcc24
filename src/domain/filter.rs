//! Free-text search and priority filtering over a ticket snapshot.
//!
//! Everything here is pure: the input order is preserved and nothing is
//! mutated, so a view can be recomputed on every keystroke.

use crate::{
    domain::ticket::{Ticket, TicketPriority},
    error::{BoardError, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Priority restriction of a filter query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriorityFilter {
    #[default]
    All,
    Only(TicketPriority),
}

impl FromStr for PriorityFilter {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        TicketPriority::from_str(s).map(Self::Only)
    }
}

impl TryFrom<String> for PriorityFilter {
    type Error = BoardError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PriorityFilter> for String {
    fn from(filter: PriorityFilter) -> Self {
        filter.to_string()
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(priority) => write!(f, "{}", priority.as_str()),
        }
    }
}

/// Ephemeral search state owned by the view layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub priority: PriorityFilter,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn with_priority(mut self, priority: PriorityFilter) -> Self {
        self.priority = priority;
        self
    }

    /// True when the query retains every ticket
    pub fn is_empty(&self) -> bool {
        self.term.is_empty() && self.priority == PriorityFilter::All
    }

    /// Whether `ticket` is visible under this query
    pub fn matches(&self, ticket: &Ticket) -> bool {
        (self.term.is_empty() || matches_search(ticket, &self.term))
            && matches_priority(ticket, self.priority)
    }
}

/// Case-insensitive substring match against title, description and each tag
pub fn matches_search(ticket: &Ticket, term: &str) -> bool {
    let term = term.to_lowercase();

    ticket.title.to_lowercase().contains(&term)
        || ticket.description.to_lowercase().contains(&term)
        || ticket.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
}

pub fn matches_priority(ticket: &Ticket, restriction: PriorityFilter) -> bool {
    match restriction {
        PriorityFilter::All => true,
        PriorityFilter::Only(priority) => ticket.priority == priority,
    }
}

/// Filters tickets by `query`, preserving input order
pub fn filter_tickets<'a, I>(tickets: I, query: &FilterQuery) -> Vec<&'a Ticket>
where
    I: IntoIterator<Item = &'a Ticket>,
{
    tickets
        .into_iter()
        .filter(|ticket| query.matches(ticket))
        .collect()
}
