use crate::domain::{
    filter::{filter_tickets, FilterQuery},
    ticket::{Ticket, TicketId, TicketStatus},
};
use serde::Serialize;

/// One status lane of the board as currently visible
#[derive(Debug, Clone, Serialize)]
pub struct LaneView<'a> {
    pub status: TicketStatus,
    pub title: String,
    pub tickets: Vec<&'a Ticket>,
}

impl<'a> LaneView<'a> {
    fn empty(status: TicketStatus) -> Self {
        Self {
            status,
            title: status.to_string(),
            tickets: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Index of the ticket within this lane, if it is visible here
    pub fn position_of(&self, id: &TicketId) -> Option<usize> {
        self.tickets.iter().position(|t| &t.id == id)
    }
}

/// The four lanes of the board in display order; every lane is always present
#[derive(Debug, Clone, Serialize)]
pub struct BoardView<'a> {
    lanes: [LaneView<'a>; 4],
}

impl<'a> BoardView<'a> {
    pub fn lane(&self, status: TicketStatus) -> &LaneView<'a> {
        &self.lanes[status.lane_index()]
    }

    pub fn lanes(&self) -> &[LaneView<'a>] {
        &self.lanes
    }

    /// Total number of visible tickets across all lanes
    pub fn len(&self) -> usize {
        self.lanes.iter().map(LaneView::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(LaneView::is_empty)
    }

    /// Concatenation of all lanes in display order
    pub fn iter(&self) -> impl Iterator<Item = &'a Ticket> + '_ {
        self.lanes.iter().flat_map(|lane| lane.tickets.iter().copied())
    }
}

/// Groups tickets into lanes by status, keeping relative order within each lane
pub fn partition<'a, I>(tickets: I) -> BoardView<'a>
where
    I: IntoIterator<Item = &'a Ticket>,
{
    let mut lanes = TicketStatus::ALL.map(LaneView::empty);
    for ticket in tickets {
        lanes[ticket.status.lane_index()].tickets.push(ticket);
    }
    BoardView { lanes }
}

/// Filters then partitions a snapshot, yielding what the board renders
pub fn board_view<'a>(tickets: &'a [Ticket], query: &FilterQuery) -> BoardView<'a> {
    partition(filter_tickets(tickets, query))
}
