pub mod board;
pub mod demo;
pub mod filter;
pub mod lanes;
pub mod reconcile;
pub mod sorting;
pub mod ticket;

pub use board::Board;
pub use filter::{filter_tickets, matches_priority, matches_search, FilterQuery, PriorityFilter};
pub use lanes::{board_view, partition, BoardView, LaneView};
pub use reconcile::{reconcile, DropEvent, Reconciled};
pub use sorting::{sort_tickets, SortField, SortOrder};
pub use ticket::{
    Tags, Ticket, TicketDraft, TicketFields, TicketId, TicketPatch, TicketPriority, TicketStatus,
};
