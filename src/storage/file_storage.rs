use crate::{
    config::BoardConfig,
    domain::{
        sorting::{sort_tickets, SortField, SortOrder},
        Board, Ticket, TicketFields, TicketId, TicketStatus,
    },
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one JSON document per ticket plus the board counter
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const BOARD_DIR: &'static str = ".tradeboard";
    const TICKETS_DIR: &'static str = "tickets";
    const BOARD_FILE: &'static str = "board.json";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::BOARD_DIR),
        }
    }

    fn tickets_dir(&self) -> PathBuf {
        self.root_path.join(Self::TICKETS_DIR)
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    /// Path of a ticket's document; only `TKT<n>` ids name a file here
    fn ticket_file(&self, id: &TicketId) -> Result<PathBuf> {
        if id.sequence_number().is_none() {
            return Err(BoardError::TicketNotFound(id.to_string()));
        }
        Ok(self.tickets_dir().join(format!("{}.json", id.as_str())))
    }

    /// Loads `config.toml` from the board directory, or defaults when absent
    pub fn load_config(&self) -> Result<BoardConfig> {
        BoardConfig::load(self.config_file())
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;
        Ok(())
    }

    async fn save_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.ensure_directory_exists(&self.tickets_dir()).await?;

        let json = serde_json::to_string_pretty(ticket)?;
        fs::write(self.ticket_file(&ticket.id)?, json).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.tickets_dir()).await?;

        if !self.board_file().exists() {
            let config = self.load_config()?;
            self.save_board(&Board::new(config.name)).await?;
            tracing::info!(path = %self.root_path.display(), "initialized file storage");
        }

        Ok(())
    }

    async fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>> {
        let tickets_dir = self.tickets_dir();

        if !tickets_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&tickets_dir).await?;
        let mut tickets = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let contents = fs::read_to_string(&path).await?;
            let ticket: Ticket = serde_json::from_str(&contents)?;
            if status.map_or(true, |s| ticket.status == s) {
                tickets.push(ticket);
            }
        }

        // Directory order is unspecified; settle ties by id first.
        sort_tickets(&mut tickets, SortField::Id, SortOrder::Ascending);
        sort_tickets(&mut tickets, SortField::Updated, SortOrder::Descending);
        Ok(tickets)
    }

    async fn load_ticket(&self, id: &TicketId) -> Result<Ticket> {
        let file_path = self.ticket_file(id)?;

        if !file_path.exists() {
            return Err(BoardError::TicketNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    async fn insert_ticket(&self, fields: &TicketFields) -> Result<Ticket> {
        fields.validate()?;

        let mut board = self.load_board().await?;
        let ticket = Ticket::new(board.next_ticket_id(), fields.clone());
        self.save_board(&board).await?;
        self.save_ticket(&ticket).await?;

        Ok(ticket)
    }

    async fn update_ticket(&self, id: &TicketId, fields: &TicketFields) -> Result<Ticket> {
        fields.validate()?;

        let mut ticket = self.load_ticket(id).await?;
        ticket.apply_fields(fields.clone());
        self.save_ticket(&ticket).await?;

        Ok(ticket)
    }

    async fn update_status(&self, id: &TicketId, status: TicketStatus) -> Result<Ticket> {
        let mut ticket = self.load_ticket(id).await?;
        ticket.set_status(status);
        self.save_ticket(&ticket).await?;

        Ok(ticket)
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        let file_path = self.ticket_file(id)?;

        if !file_path.exists() {
            return Err(BoardError::TicketNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}
