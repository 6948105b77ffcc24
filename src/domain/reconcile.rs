//! Drag-and-drop reconciliation.
//!
//! The store keeps a single flat sequence of tickets, while drop events
//! arrive in the coordinates of the rendered board: a lane plus an index
//! into that lane's *visible* (filtered) tickets. [`reconcile`] is the one
//! place that translates between the two index spaces.

use crate::domain::{
    filter::FilterQuery,
    ticket::{Ticket, TicketId, TicketStatus},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload reported by the board when a ticket is released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    pub ticket_id: TicketId,
    pub source_lane: TicketStatus,
    pub source_index: usize,
    pub destination_lane: TicketStatus,
    pub destination_index: usize,
}

impl DropEvent {
    pub fn new(
        ticket_id: TicketId,
        (source_lane, source_index): (TicketStatus, usize),
        (destination_lane, destination_index): (TicketStatus, usize),
    ) -> Self {
        Self {
            ticket_id,
            source_lane,
            source_index,
            destination_lane,
            destination_index,
        }
    }

    /// Dropped back onto the slot it was picked up from
    pub fn is_same_slot(&self) -> bool {
        self.source_lane == self.destination_lane && self.source_index == self.destination_index
    }

    pub fn changes_lane(&self) -> bool {
        self.source_lane != self.destination_lane
    }
}

/// Result of applying a drop to a global sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The new global sequence
    pub tickets: Vec<Ticket>,
    /// Position of the moved ticket in `tickets`
    pub index: usize,
    /// Status the ticket had before the drop
    pub previous_status: TicketStatus,
}

impl Reconciled {
    pub fn ticket(&self) -> &Ticket {
        &self.tickets[self.index]
    }

    pub fn status_changed(&self) -> bool {
        self.previous_status != self.ticket().status
    }
}

/// Computes the global sequence that results from `event`
///
/// Returns `None` when the sequence is unchanged: the ticket was dropped
/// onto its own slot, or it no longer exists (the board snapshot raced a
/// delete). Otherwise the ticket is removed, its status set to the
/// destination lane, and it is reinserted immediately before the ticket
/// currently visible at `destination_index` in the destination lane under
/// `query`. A destination index at or past the end of that lane appends the
/// ticket to the end of the sequence.
pub fn reconcile(
    tickets: &[Ticket],
    query: &FilterQuery,
    event: &DropEvent,
    now: DateTime<Utc>,
) -> Option<Reconciled> {
    if event.is_same_slot() {
        tracing::debug!(ticket = %event.ticket_id, "drop onto own slot, nothing to do");
        return None;
    }

    let Some(from) = tickets.iter().position(|t| t.id == event.ticket_id) else {
        tracing::warn!(ticket = %event.ticket_id, "dropped ticket no longer exists, ignoring");
        return None;
    };

    let mut remaining = tickets.to_vec();
    let mut moved = remaining.remove(from);
    let previous_status = moved.status;
    if previous_status != event.source_lane {
        tracing::debug!(
            ticket = %moved.id,
            actual = %previous_status,
            reported = %event.source_lane,
            "drop source lane is stale"
        );
    }

    moved.status = event.destination_lane;
    moved.touch_at(now);

    let index = insertion_index(&remaining, query, event.destination_lane, event.destination_index);
    remaining.insert(index, moved);

    Some(Reconciled {
        tickets: remaining,
        index,
        previous_status,
    })
}

/// Global index at which a ticket lands when dropped at `lane_index` of `lane`
///
/// `tickets` must not contain the dragged ticket.
pub fn insertion_index(
    tickets: &[Ticket],
    query: &FilterQuery,
    lane: TicketStatus,
    lane_index: usize,
) -> usize {
    tickets
        .iter()
        .enumerate()
        .filter(|(_, t)| t.status == lane && query.matches(t))
        .nth(lane_index)
        .map(|(global, _)| global)
        .unwrap_or(tickets.len())
}
