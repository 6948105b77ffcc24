//! Ticket lifecycle operations against a backing store.
//!
//! Create, edit, status-only patch and delete write to the [`Storage`] first
//! and then mirror the canonical row into the local [`TicketStore`]: new rows
//! are appended, existing rows are replaced in place so their position on the
//! board is kept. Drag-and-drop is applied locally first; a resulting status
//! change is then persisted, and the local order is rolled back if that fails.
//!
//! Intra-lane order lives only in the local store. Reloading yields the
//! backing store's listing order.

use crate::{
    config::BoardConfig,
    domain::{
        demo::demo_drafts,
        filter::FilterQuery,
        lanes::BoardView,
        reconcile::DropEvent,
        ticket::{Ticket, TicketDraft, TicketId, TicketPatch, TicketStatus},
    },
    error::Result,
    storage::Storage,
    store::TicketStore,
};

pub struct TicketService<S: Storage> {
    storage: S,
    store: TicketStore,
    config: BoardConfig,
}

impl<S: Storage> TicketService<S> {
    pub fn new(storage: S, config: BoardConfig) -> Self {
        Self {
            storage,
            store: TicketStore::new(config.defaults.clone()),
            config,
        }
    }

    /// Initializes the backing store, seeds it if configured, and loads every ticket
    pub async fn open(storage: S, config: BoardConfig) -> Result<Self> {
        let mut service = Self::new(storage, config);
        service.storage.initialize().await?;
        if service.config.seed_demo_data {
            service.seed_if_empty().await?;
        }
        service.reload().await?;
        Ok(service)
    }

    pub fn store(&self) -> &TicketStore {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Replaces local state with the backing store's listing
    pub async fn reload(&mut self) -> Result<()> {
        let tickets = self.storage.list_tickets(None).await?;
        self.store = TicketStore::from_tickets(tickets, self.config.defaults.clone())?;
        tracing::debug!(count = self.store.len(), "loaded tickets");
        Ok(())
    }

    /// Inserts the demo tickets when the backing store holds none
    pub async fn seed_if_empty(&mut self) -> Result<usize> {
        if !self.storage.list_tickets(None).await?.is_empty() {
            return Ok(0);
        }

        let drafts = demo_drafts();
        let count = drafts.len();
        for draft in drafts {
            let fields = draft.resolve(&self.config.defaults)?;
            self.storage.insert_ticket(&fields).await?;
        }
        tracing::info!(count, "seeded demo tickets");
        Ok(count)
    }

    /// Filtered, lane-partitioned view of the local state
    pub fn view(&self, query: &FilterQuery) -> BoardView<'_> {
        self.store.view(query)
    }

    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.store.get(id)
    }

    pub async fn create(&mut self, draft: TicketDraft) -> Result<Ticket> {
        let fields = draft.resolve(&self.config.defaults)?;
        let ticket = self.storage.insert_ticket(&fields).await?;
        self.store.adopt(ticket.clone())?;
        Ok(ticket)
    }

    /// Full edit; fields absent from the patch keep their stored values
    pub async fn edit(&mut self, id: &TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let current = self.storage.load_ticket(id).await?;
        let fields = patch.apply_to(&current.fields(), &self.config.defaults)?;
        let ticket = self.storage.update_ticket(id, &fields).await?;
        self.mirror(ticket)
    }

    /// Status-only patch; the ticket keeps its place in the local sequence
    pub async fn patch_status(&mut self, id: &TicketId, status: TicketStatus) -> Result<Ticket> {
        let ticket = self.storage.update_status(id, status).await?;
        self.mirror(ticket)
    }

    /// Like [`patch_status`](Self::patch_status), parsing the status from its wire form
    pub async fn patch_status_str(&mut self, id: &TicketId, status: &str) -> Result<Ticket> {
        let status = status.parse()?;
        self.patch_status(id, status).await
    }

    pub async fn delete(&mut self, id: &TicketId) -> Result<()> {
        self.storage.delete_ticket(id).await?;
        if self.store.get(id).is_some() {
            self.store.delete(id)?;
        }
        Ok(())
    }

    /// Applies a drop from the board under the query the board was rendered with
    ///
    /// Returns `Ok(None)` when the drop changed nothing. If the drop moved the
    /// ticket to another lane and persisting the new status fails, the local
    /// order is restored and the storage error returned.
    pub async fn drop_ticket(
        &mut self,
        query: &FilterQuery,
        event: &DropEvent,
    ) -> Result<Option<Ticket>> {
        let snapshot = self.store.snapshot();
        let Some(reconciled) = self.store.apply_drop(query, event) else {
            return Ok(None);
        };

        if !reconciled.status_changed() {
            return Ok(Some(reconciled.ticket().clone()));
        }

        match self
            .storage
            .update_status(&event.ticket_id, event.destination_lane)
            .await
        {
            Ok(ticket) => self.mirror(ticket).map(Some),
            Err(err) => {
                tracing::warn!(
                    ticket = %event.ticket_id,
                    error = %err,
                    "failed to persist drop, reverting local order"
                );
                self.store.restore(snapshot);
                Err(err)
            }
        }
    }

    /// Mirrors a canonical row into the local store, in place when already present
    fn mirror(&mut self, ticket: Ticket) -> Result<Ticket> {
        if self.store.get(&ticket.id).is_some() {
            self.store.replace(ticket)
        } else {
            self.store.adopt(ticket.clone())?;
            Ok(ticket)
        }
    }
}

#[cfg(all(test, feature = "file-storage"))]
mod tests {
    use super::*;
    use crate::{error::BoardError, storage::file_storage::FileStorage};
    use tempfile::TempDir;

    async fn service() -> (TempDir, TicketService<FileStorage>) {
        let temp_dir = TempDir::new().unwrap();
        let service = TicketService::open(FileStorage::new(temp_dir.path()), BoardConfig::default())
            .await
            .unwrap();
        (temp_dir, service)
    }

    #[tokio::test]
    async fn test_create_persists_and_appends() {
        let (_temp_dir, mut service) = service().await;

        let ticket = service.create(TicketDraft::new("Set up alerts")).await.unwrap();

        assert_eq!(ticket.id.as_str(), "TKT1");
        assert_eq!(service.store().len(), 1);
        assert_eq!(service.storage().load_ticket(&ticket.id).await.unwrap(), ticket);
    }

    #[tokio::test]
    async fn test_create_validation_error_surfaces_unchanged() {
        let (_temp_dir, mut service) = service().await;

        let result = service.create(TicketDraft::new("")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, BoardError::Validation(_)));
        assert_eq!(err.status_code(), 400);
        assert!(service.store().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_position() {
        let (_temp_dir, mut service) = service().await;
        let a = service.create(TicketDraft::new("A")).await.unwrap();
        let b = service.create(TicketDraft::new("B")).await.unwrap();

        let edited = service
            .edit(&a.id, &TicketPatch::new().description("notes"))
            .await
            .unwrap();

        assert_eq!(edited.description, "notes");
        let order: Vec<_> = service.store().tickets().iter().map(|t| t.id.clone()).collect();
        assert_eq!(order, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_patch_status_invalid_value() {
        let (_temp_dir, mut service) = service().await;
        let ticket = service.create(TicketDraft::new("A")).await.unwrap();

        let result = service.patch_status_str(&ticket.id, "archived").await;
        assert!(matches!(result, Err(BoardError::Validation(_))));

        let moved = service.patch_status_str(&ticket.id, "hold").await.unwrap();
        assert_eq!(moved.status, TicketStatus::Hold);
        assert_eq!(service.get(&ticket.id).unwrap().status, TicketStatus::Hold);
    }

    #[tokio::test]
    async fn test_delete_missing_ticket() {
        let (_temp_dir, mut service) = service().await;
        service.create(TicketDraft::new("A")).await.unwrap();

        let result = service.delete(&TicketId::sequential(99)).await;

        let err = result.unwrap_err();
        assert!(matches!(err, BoardError::TicketNotFound(_)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_persists_status_change() {
        let (_temp_dir, mut service) = service().await;
        let t1 = service.create(TicketDraft::new("T1")).await.unwrap();
        let t2 = service.create(TicketDraft::new("T2")).await.unwrap();
        let t3 = service
            .create(TicketDraft::new("T3").with_status(TicketStatus::InProgress))
            .await
            .unwrap();

        let event = DropEvent::new(
            t2.id.clone(),
            (TicketStatus::Todo, 1),
            (TicketStatus::InProgress, 0),
        );
        let moved = service
            .drop_ticket(&FilterQuery::new(), &event)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(moved.status, TicketStatus::InProgress);
        let stored = service.storage().load_ticket(&t2.id).await.unwrap();
        assert_eq!(stored.status, TicketStatus::InProgress);

        let view = service.view(&FilterQuery::new());
        let doing: Vec<_> = view
            .lane(TicketStatus::InProgress)
            .tickets
            .iter()
            .map(|t| t.id.clone())
            .collect();
        assert_eq!(doing, vec![t2.id.clone(), t3.id.clone()]);
        assert_eq!(view.lane(TicketStatus::Todo).len(), 1);
        assert_eq!(view.lane(TicketStatus::Todo).tickets[0].id, t1.id);
    }

    #[tokio::test]
    async fn test_drop_reverts_when_persist_fails() {
        let (_temp_dir, mut service) = service().await;
        let a = service.create(TicketDraft::new("A")).await.unwrap();
        service.create(TicketDraft::new("B")).await.unwrap();
        let before = service.store().snapshot();

        // Remove the row behind the store's back so the status write fails.
        service.storage().delete_ticket(&a.id).await.unwrap();

        let event = DropEvent::new(a.id.clone(), (TicketStatus::Todo, 0), (TicketStatus::Done, 0));
        let result = service.drop_ticket(&FilterQuery::new(), &event).await;

        assert!(matches!(result, Err(BoardError::TicketNotFound(_))));
        assert_eq!(service.store().tickets(), before.as_slice());
    }

    #[tokio::test]
    async fn test_same_lane_drop_is_local_only() {
        let (_temp_dir, mut service) = service().await;
        let a = service.create(TicketDraft::new("A")).await.unwrap();
        let b = service.create(TicketDraft::new("B")).await.unwrap();

        let event = DropEvent::new(b.id.clone(), (TicketStatus::Todo, 1), (TicketStatus::Todo, 0));
        let moved = service
            .drop_ticket(&FilterQuery::new(), &event)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(moved.id, b.id);
        let order: Vec<_> = service.store().tickets().iter().map(|t| t.id.clone()).collect();
        assert_eq!(order, vec![b.id.clone(), a.id.clone()]);
        assert_eq!(
            service.storage().load_ticket(&b.id).await.unwrap().status,
            TicketStatus::Todo
        );
    }

    #[tokio::test]
    async fn test_open_seeds_demo_data_once() {
        let temp_dir = TempDir::new().unwrap();
        let config = BoardConfig {
            seed_demo_data: true,
            ..BoardConfig::default()
        };

        let service = TicketService::open(FileStorage::new(temp_dir.path()), config.clone())
            .await
            .unwrap();
        assert_eq!(service.store().len(), 7);

        let reopened = TicketService::open(FileStorage::new(temp_dir.path()), config)
            .await
            .unwrap();
        assert_eq!(reopened.store().len(), 7);

        let gold = reopened.view(&FilterQuery::new().with_term("gold"));
        assert_eq!(gold.len(), 1);
        assert_eq!(gold.lane(TicketStatus::InProgress).len(), 1);
    }
}
