//! The in-memory ticket store.
//!
//! A single ordered sequence of tickets is the only record of intra-lane
//! order: two tickets in the same lane are ordered exactly as they appear in
//! the sequence. Identifiers are never reused or reassigned, and every
//! mutation goes through the methods below.

use crate::{
    config::FieldDefaults,
    domain::{
        filter::FilterQuery,
        lanes::{board_view, BoardView},
        reconcile::{reconcile, DropEvent, Reconciled},
        ticket::{Ticket, TicketDraft, TicketId, TicketPatch, TicketStatus},
    },
    error::{BoardError, Result},
};
use chrono::Utc;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct TicketStore {
    tickets: Vec<Ticket>,
    defaults: FieldDefaults,
}

impl TicketStore {
    pub fn new(defaults: FieldDefaults) -> Self {
        Self {
            tickets: Vec::new(),
            defaults,
        }
    }

    /// Builds a store from an existing sequence, rejecting duplicate ids
    pub fn from_tickets(tickets: Vec<Ticket>, defaults: FieldDefaults) -> Result<Self> {
        ensure_unique(&tickets)?;
        Ok(Self { tickets, defaults })
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    /// The global sequence
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| &t.id == id)
    }

    fn position(&self, id: &TicketId) -> Result<usize> {
        self.tickets
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| BoardError::TicketNotFound(id.to_string()))
    }

    /// Filtered, lane-partitioned view of the current sequence
    pub fn view(&self, query: &FilterQuery) -> BoardView<'_> {
        board_view(&self.tickets, query)
    }

    /// Creates a ticket with a fresh id and appends it to the sequence
    pub fn create(&mut self, draft: TicketDraft) -> Result<Ticket> {
        let fields = draft.resolve(&self.defaults)?;
        let ticket = Ticket::new(TicketId::generate(), fields);
        tracing::debug!(ticket = %ticket.id, status = %ticket.status, "created ticket");

        self.tickets.push(ticket.clone());
        Ok(ticket)
    }

    /// Appends a ticket whose id was assigned elsewhere (e.g. by a backing store)
    pub fn adopt(&mut self, ticket: Ticket) -> Result<()> {
        if self.get(&ticket.id).is_some() {
            return Err(BoardError::Conflict(format!(
                "ticket {} is already on the board",
                ticket.id
            )));
        }
        tracing::debug!(ticket = %ticket.id, "adopted ticket");
        self.tickets.push(ticket);
        Ok(())
    }

    /// Replaces a ticket's state in place, keeping its position
    pub fn replace(&mut self, ticket: Ticket) -> Result<Ticket> {
        let index = self.position(&ticket.id)?;
        self.tickets[index] = ticket.clone();
        Ok(ticket)
    }

    /// Applies a partial edit in place
    pub fn update(&mut self, id: &TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let index = self.position(id)?;
        let fields = patch.apply_to(&self.tickets[index].fields(), &self.defaults)?;

        let ticket = &mut self.tickets[index];
        ticket.apply_fields(fields);
        tracing::debug!(ticket = %ticket.id, status = %ticket.status, "updated ticket");
        Ok(ticket.clone())
    }

    /// Changes only the status, keeping the ticket's place in the sequence
    pub fn set_status(&mut self, id: &TicketId, status: TicketStatus) -> Result<Ticket> {
        let index = self.position(id)?;

        let ticket = &mut self.tickets[index];
        ticket.set_status(status);
        tracing::debug!(ticket = %ticket.id, status = %status, "changed ticket status");
        Ok(ticket.clone())
    }

    /// Removes a ticket, returning it
    pub fn delete(&mut self, id: &TicketId) -> Result<Ticket> {
        let index = self.position(id)?;
        let ticket = self.tickets.remove(index);
        tracing::debug!(ticket = %ticket.id, "deleted ticket");
        Ok(ticket)
    }

    /// Rearranges the sequence to match `order`, which must be a permutation of the current ids
    pub fn reorder(&mut self, order: &[TicketId]) -> Result<()> {
        if order.len() != self.tickets.len() {
            return Err(BoardError::Validation(format!(
                "reorder expects {} ids, got {}",
                self.tickets.len(),
                order.len()
            )));
        }

        let mut remaining: Vec<Option<Ticket>> = self.tickets.iter().cloned().map(Some).collect();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|t| &t.id == id))
                .ok_or_else(|| {
                    BoardError::Validation(format!("reorder references unknown or repeated id {}", id))
                })?;
            if let Some(ticket) = slot.take() {
                reordered.push(ticket);
            }
        }

        self.tickets = reordered;
        Ok(())
    }

    /// Applies a drop event from the board
    ///
    /// Returns `None` and leaves the store untouched when the drop is a no-op
    /// or references a ticket that no longer exists.
    pub fn apply_drop(&mut self, query: &FilterQuery, event: &DropEvent) -> Option<Reconciled> {
        let reconciled = reconcile(&self.tickets, query, event, Utc::now())?;
        tracing::debug!(
            ticket = %event.ticket_id,
            from = %reconciled.previous_status,
            to = %event.destination_lane,
            index = reconciled.index,
            "applied drop"
        );
        self.tickets = reconciled.tickets.clone();
        Some(reconciled)
    }

    /// Copy of the sequence, for reverting a failed optimistic change
    pub fn snapshot(&self) -> Vec<Ticket> {
        self.tickets.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Ticket>) {
        self.tickets = snapshot;
    }
}

fn ensure_unique(tickets: &[Ticket]) -> Result<()> {
    let mut seen = HashSet::new();
    for ticket in tickets {
        if !seen.insert(&ticket.id) {
            return Err(BoardError::Conflict(format!(
                "duplicate ticket id {}",
                ticket.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ticket::TicketPriority;

    fn store_with(titles: &[(&str, TicketStatus)]) -> (TicketStore, Vec<TicketId>) {
        let mut store = TicketStore::default();
        let ids = titles
            .iter()
            .map(|(title, status)| {
                store
                    .create(TicketDraft::new(*title).with_status(*status))
                    .unwrap()
                    .id
            })
            .collect();
        (store, ids)
    }

    fn order(store: &TicketStore) -> Vec<TicketId> {
        store.tickets().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_create_appends_with_defaults() {
        let mut store = TicketStore::default();
        let ticket = store.create(TicketDraft::new("Set up alerts")).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(ticket.status, TicketStatus::Todo);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert_eq!(ticket.assignee, "Jacob");
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert_eq!(store.get(&ticket.id), Some(&ticket));
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut store = TicketStore::default();
        let result = store.create(TicketDraft::new("   "));
        assert!(matches!(result, Err(BoardError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_uses_configured_defaults() {
        let defaults = FieldDefaults {
            assignee: "Ana".to_string(),
            priority: TicketPriority::Low,
            status: TicketStatus::Hold,
        };
        let mut store = TicketStore::new(defaults);
        let ticket = store.create(TicketDraft::new("Check spreads")).unwrap();

        assert_eq!(ticket.assignee, "Ana");
        assert_eq!(ticket.priority, TicketPriority::Low);
        assert_eq!(ticket.status, TicketStatus::Hold);
    }

    #[test]
    fn test_update_preserves_position_and_identity() {
        let (mut store, ids) = store_with(&[
            ("A", TicketStatus::Todo),
            ("B", TicketStatus::Todo),
            ("C", TicketStatus::Todo),
        ]);
        let before = store.get(&ids[1]).unwrap().clone();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = store
            .update(&ids[1], &TicketPatch::new().title("B2").priority(TicketPriority::High))
            .unwrap();

        assert_eq!(updated.id, ids[1]);
        assert_eq!(updated.title, "B2");
        assert!(updated.updated_at > before.updated_at);
        assert_eq!(updated.created_at, before.created_at);
        assert_eq!(order(&store), ids);
    }

    #[test]
    fn test_update_missing_ticket() {
        let mut store = TicketStore::default();
        let result = store.update(&TicketId::sequential(1), &TicketPatch::new().title("x"));
        assert!(matches!(result, Err(BoardError::TicketNotFound(_))));
    }

    #[test]
    fn test_set_status_keeps_sequence_position() {
        let (mut store, ids) = store_with(&[
            ("A", TicketStatus::Todo),
            ("B", TicketStatus::Done),
            ("C", TicketStatus::Todo),
        ]);

        let ticket = store.set_status(&ids[0], TicketStatus::Done).unwrap();
        assert_eq!(ticket.status, TicketStatus::Done);
        assert_eq!(order(&store), ids);

        let done: Vec<_> = store
            .view(&FilterQuery::new())
            .lane(TicketStatus::Done)
            .tickets
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(done, vec![ids[0].clone(), ids[1].clone()]);
    }

    #[test]
    fn test_delete_missing_ticket_leaves_store_unchanged() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo), ("B", TicketStatus::Hold)]);
        let before = store.snapshot();

        let result = store.delete(&TicketId::sequential(99));

        assert!(matches!(result, Err(BoardError::TicketNotFound(_))));
        assert_eq!(store.tickets(), before.as_slice());
        assert_eq!(order(&store), ids);
    }

    #[test]
    fn test_delete_removes_only_target() {
        let (mut store, ids) = store_with(&[
            ("A", TicketStatus::Todo),
            ("B", TicketStatus::Todo),
            ("C", TicketStatus::Todo),
        ]);

        let removed = store.delete(&ids[1]).unwrap();
        assert_eq!(removed.id, ids[1]);
        assert_eq!(order(&store), vec![ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_reorder_permutation() {
        let (mut store, ids) = store_with(&[
            ("A", TicketStatus::Todo),
            ("B", TicketStatus::Todo),
            ("C", TicketStatus::Todo),
        ]);
        let reversed: Vec<_> = ids.iter().rev().cloned().collect();

        store.reorder(&reversed).unwrap();
        assert_eq!(order(&store), reversed);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo), ("B", TicketStatus::Todo)]);

        let repeated = vec![ids[0].clone(), ids[0].clone()];
        assert!(matches!(
            store.reorder(&repeated),
            Err(BoardError::Validation(_))
        ));

        let short = vec![ids[0].clone()];
        assert!(matches!(store.reorder(&short), Err(BoardError::Validation(_))));

        let unknown = vec![ids[0].clone(), TicketId::sequential(5)];
        assert!(matches!(
            store.reorder(&unknown),
            Err(BoardError::Validation(_))
        ));

        assert_eq!(order(&store), ids);
    }

    #[test]
    fn test_apply_drop_moves_between_lanes() {
        let (mut store, ids) = store_with(&[
            ("T1", TicketStatus::Todo),
            ("T2", TicketStatus::Todo),
            ("T3", TicketStatus::InProgress),
        ]);
        let event = DropEvent::new(
            ids[1].clone(),
            (TicketStatus::Todo, 1),
            (TicketStatus::InProgress, 0),
        );

        let result = store.apply_drop(&FilterQuery::new(), &event).unwrap();
        assert!(result.status_changed());

        let view = store.view(&FilterQuery::new());
        let todo: Vec<_> = view.lane(TicketStatus::Todo).tickets.iter().map(|t| &t.id).collect();
        let doing: Vec<_> = view
            .lane(TicketStatus::InProgress)
            .tickets
            .iter()
            .map(|t| &t.id)
            .collect();
        assert_eq!(todo, vec![&ids[0]]);
        assert_eq!(doing, vec![&ids[1], &ids[2]]);
        assert_eq!(store.get(&ids[1]).unwrap().status, TicketStatus::InProgress);
    }

    #[test]
    fn test_apply_drop_same_slot_does_not_touch() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo)]);
        let before = store.snapshot();
        let event = DropEvent::new(ids[0].clone(), (TicketStatus::Todo, 0), (TicketStatus::Todo, 0));

        assert!(store.apply_drop(&FilterQuery::new(), &event).is_none());
        assert_eq!(store.tickets(), before.as_slice());
    }

    #[test]
    fn test_apply_drop_after_concurrent_delete_is_noop() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo), ("B", TicketStatus::Todo)]);
        store.delete(&ids[0]).unwrap();
        let before = store.snapshot();

        let event = DropEvent::new(ids[0].clone(), (TicketStatus::Todo, 0), (TicketStatus::Done, 0));
        assert!(store.apply_drop(&FilterQuery::new(), &event).is_none());
        assert_eq!(store.tickets(), before.as_slice());
    }

    #[test]
    fn test_adopt_rejects_duplicate() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo)]);
        let copy = store.get(&ids[0]).unwrap().clone();
        assert!(matches!(store.adopt(copy), Err(BoardError::Conflict(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_tickets_rejects_duplicates() {
        let (store, _) = store_with(&[("A", TicketStatus::Todo)]);
        let mut tickets = store.snapshot();
        tickets.push(tickets[0].clone());

        let result = TicketStore::from_tickets(tickets, FieldDefaults::default());
        assert!(matches!(result, Err(BoardError::Conflict(_))));
    }

    #[test]
    fn test_replace_keeps_position() {
        let (mut store, ids) = store_with(&[("A", TicketStatus::Todo), ("B", TicketStatus::Todo)]);
        let mut changed = store.get(&ids[0]).unwrap().clone();
        changed.title = "A2".to_string();

        store.replace(changed).unwrap();
        assert_eq!(store.tickets()[0].title, "A2");
        assert_eq!(order(&store), ids);
    }
}
