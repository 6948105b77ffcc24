use crate::domain::ticket::Ticket;
use std::cmp::Ordering;

/// Fields a backing store can order its listing by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Sorts tickets in place by the given field and order
///
/// The sort is stable, so tickets comparing equal keep their relative order.
///
/// # Examples
/// ```
/// use tradeboard_core::domain::sorting::{sort_tickets, SortField, SortOrder};
/// use tradeboard_core::domain::ticket::{Ticket, TicketDraft, TicketId};
/// use tradeboard_core::FieldDefaults;
///
/// let defaults = FieldDefaults::default();
/// let mut tickets: Vec<Ticket> = [10, 2, 1]
///     .into_iter()
///     .map(|n| {
///         let fields = TicketDraft::new(format!("Ticket {}", n)).resolve(&defaults).unwrap();
///         Ticket::new(TicketId::sequential(n), fields)
///     })
///     .collect();
///
/// sort_tickets(&mut tickets, SortField::Id, SortOrder::Ascending);
/// assert_eq!(tickets[0].id.as_str(), "TKT1");
/// assert_eq!(tickets[2].id.as_str(), "TKT10");
/// ```
pub fn sort_tickets(tickets: &mut [Ticket], field: SortField, order: SortOrder) {
    tickets.sort_by(|a, b| {
        let cmp = match field {
            SortField::Id => compare_ids(a.id.as_str(), b.id.as_str()),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Shorter ids first so TKT2 sorts before TKT10
fn compare_ids(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
