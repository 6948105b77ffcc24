use crate::{
    domain::ticket::{Ticket, TicketFields, TicketId, TicketStatus},
    error::Result,
};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// Backing store for tickets
///
/// Implementations assign ids on insert and refresh `updated_at` on every
/// write; each mutation returns the canonical row. No intra-lane ordering is
/// persisted.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Lists tickets, most recently updated first, optionally restricted to one status
    async fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>>;

    /// Loads a ticket by ID
    async fn load_ticket(&self, id: &TicketId) -> Result<Ticket>;

    /// Inserts a new ticket, returning it with its assigned ID
    async fn insert_ticket(&self, fields: &TicketFields) -> Result<Ticket>;

    /// Overwrites every editable field of a ticket
    async fn update_ticket(&self, id: &TicketId, fields: &TicketFields) -> Result<Ticket>;

    /// Changes only the status of a ticket
    async fn update_status(&self, id: &TicketId, status: TicketStatus) -> Result<Ticket>;

    /// Deletes a ticket
    async fn delete_ticket(&self, id: &TicketId) -> Result<()>;

    /// Checks if the backend is initialized
    async fn is_initialized(&self) -> bool;
}
