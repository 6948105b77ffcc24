//! # Tradeboard Core
//!
//! Ticket state machine for a single-board kanban tracker.
//!
//! Tickets live in one ordered [`TicketStore`]; search, priority filtering
//! and lane partitioning are pure projections over it, and drag-and-drop
//! events are reconciled back into the global order. The
//! [`TicketService`] keeps the store consistent with a [`Storage`] backend.

pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use config::{BoardConfig, FieldDefaults};
pub use domain::{
    filter::{FilterQuery, PriorityFilter},
    lanes::{BoardView, LaneView},
    reconcile::DropEvent,
    ticket::{Tags, Ticket, TicketDraft, TicketId, TicketPatch, TicketPriority, TicketStatus},
};
pub use error::{BoardError, ErrorKind, Result};
pub use lifecycle::TicketService;
pub use storage::Storage;
pub use store::TicketStore;
