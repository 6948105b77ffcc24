use crate::{
    domain::{Tags, Ticket, TicketFields, TicketId, TicketStatus},
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{path::Path, str::FromStr, sync::Mutex};

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL CHECK(status IN ('todo', 'inprogress', 'hold', 'done')) DEFAULT 'todo',
        priority TEXT NOT NULL CHECK(priority IN ('high', 'medium', 'low')) DEFAULT 'medium',
        tags TEXT NOT NULL DEFAULT '',
        assignee TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

const SELECT_COLUMNS: &str =
    "id, title, description, status, priority, tags, assignee, created_at, updated_at";

/// SQLite-based storage backend; ids are autoincrement row ids
pub struct SqliteStorage {
    connection: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `database_path`
    pub fn new(database_path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(database_path).map_err(storage_error)?;
        Ok(Self::with_connection(connection))
    }

    /// Opens a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(storage_error)?;
        Ok(Self::with_connection(connection))
    }

    fn with_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| BoardError::StorageError("connection lock poisoned".to_string()))?;
        f(&connection)
    }
}

fn storage_error(err: rusqlite::Error) -> BoardError {
    BoardError::StorageError(err.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width form so lexicographic ORDER BY matches chronological order
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| BoardError::StorageError(format!("invalid timestamp '{}': {}", value, e)))
}

/// Row ids are integers; anything else cannot name a stored ticket
fn row_id(id: &TicketId) -> Result<i64> {
    id.as_str()
        .parse()
        .map_err(|_| BoardError::TicketNotFound(id.to_string()))
}

struct TicketRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    priority: String,
    tags: String,
    assignee: String,
    created_at: String,
    updated_at: String,
}

impl TicketRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: row.get("status")?,
            priority: row.get("priority")?,
            tags: row.get("tags")?,
            assignee: row.get("assignee")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_ticket(self) -> Result<Ticket> {
        Ok(Ticket {
            id: TicketId::from(self.id),
            title: self.title,
            description: self.description,
            status: TicketStatus::from_str(&self.status)?,
            priority: self.priority.parse()?,
            tags: Tags::from_delimited(&self.tags),
            assignee: self.assignee,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn select_ticket(conn: &Connection, id: i64) -> Result<Option<Ticket>> {
    let sql = format!("SELECT {} FROM tickets WHERE id = ?1", SELECT_COLUMNS);
    conn.query_row(&sql, params![id], TicketRow::from_row)
        .optional()
        .map_err(storage_error)?
        .map(TicketRow::into_ticket)
        .transpose()
}

fn require_ticket(conn: &Connection, id: &TicketId) -> Result<Ticket> {
    select_ticket(conn, row_id(id)?)?.ok_or_else(|| BoardError::TicketNotFound(id.to_string()))
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch(CREATE_TABLE_SQL).map_err(storage_error)?;
            tracing::info!("tickets table ready");
            Ok(())
        })
    }

    async fn list_tickets(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM tickets WHERE (?1 IS NULL OR status = ?1) ORDER BY updated_at DESC, id ASC",
                SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql).map_err(storage_error)?;
            let rows = stmt
                .query_map(params![status.map(|s| s.as_str())], TicketRow::from_row)
                .map_err(storage_error)?;

            let mut tickets = Vec::new();
            for row in rows {
                tickets.push(row.map_err(storage_error)?.into_ticket()?);
            }
            Ok(tickets)
        })
    }

    async fn load_ticket(&self, id: &TicketId) -> Result<Ticket> {
        self.with_conn(|conn| require_ticket(conn, id))
    }

    async fn insert_ticket(&self, fields: &TicketFields) -> Result<Ticket> {
        fields.validate()?;

        self.with_conn(|conn| {
            let now = timestamp(Utc::now());
            conn.execute(
                "INSERT INTO tickets (title, description, status, priority, tags, assignee, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    fields.title,
                    fields.description,
                    fields.status.as_str(),
                    fields.priority.as_str(),
                    fields.tags.to_delimited(),
                    fields.assignee,
                    now,
                ],
            )
            .map_err(storage_error)?;

            let id = conn.last_insert_rowid();
            select_ticket(conn, id)?
                .ok_or_else(|| BoardError::StorageError(format!("inserted row {} vanished", id)))
        })
    }

    async fn update_ticket(&self, id: &TicketId, fields: &TicketFields) -> Result<Ticket> {
        fields.validate()?;

        self.with_conn(|conn| {
            let existing = require_ticket(conn, id)?;
            let updated_at = timestamp(Utc::now().max(existing.created_at));
            conn.execute(
                "UPDATE tickets
                 SET title = ?1, description = ?2, status = ?3, priority = ?4, tags = ?5,
                     assignee = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    fields.title,
                    fields.description,
                    fields.status.as_str(),
                    fields.priority.as_str(),
                    fields.tags.to_delimited(),
                    fields.assignee,
                    updated_at,
                    row_id(id)?,
                ],
            )
            .map_err(storage_error)?;

            require_ticket(conn, id)
        })
    }

    async fn update_status(&self, id: &TicketId, status: TicketStatus) -> Result<Ticket> {
        self.with_conn(|conn| {
            let existing = require_ticket(conn, id)?;
            let updated_at = timestamp(Utc::now().max(existing.created_at));
            conn.execute(
                "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), updated_at, row_id(id)?],
            )
            .map_err(storage_error)?;

            require_ticket(conn, id)
        })
    }

    async fn delete_ticket(&self, id: &TicketId) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn
                .execute("DELETE FROM tickets WHERE id = ?1", params![row_id(id)?])
                .map_err(storage_error)?;
            if deleted == 0 {
                return Err(BoardError::TicketNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    async fn is_initialized(&self) -> bool {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tickets'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map_err(storage_error)
        })
        .map(|count| count > 0)
        .unwrap_or(false)
    }
}
