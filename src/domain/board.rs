use crate::domain::ticket::TicketId;
use serde::{Deserialize, Serialize};

/// Persisted board bookkeeping for backends that assign their own ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    pub next_ticket_number: u32,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_ticket_number: 1,
        }
    }

    /// Generates the next ticket ID
    pub fn next_ticket_id(&mut self) -> TicketId {
        let id = TicketId::sequential(self.next_ticket_number);
        self.next_ticket_number += 1;
        id
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new("Trading Board")
    }
}
