use crate::{
    config::FieldDefaults,
    error::{BoardError, Result},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Stable, opaque identifier of a ticket
///
/// Identifiers are assigned once at creation and never reassigned. Locally
/// created tickets get a UUID; backing stores may assign their own format
/// (e.g. TKT1, TKT2 or a numeric row id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    const SEQUENTIAL_PREFIX: &'static str = "TKT";

    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a sequential identifier from a counter (TKT1, TKT2, ...)
    pub fn sequential(counter: u32) -> Self {
        Self(format!("{}{}", Self::SEQUENTIAL_PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Counter of a sequential id (`TKT7` → 7); `None` for any other format
    pub fn sequence_number(&self) -> Option<u32> {
        let digits = self.0.strip_prefix(Self::SEQUENTIAL_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl FromStr for TicketId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BoardError::validation("ticket id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<i64> for TicketId {
    fn from(row_id: i64) -> Self {
        Self(row_id.to_string())
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a ticket, one per board lane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Todo,
    InProgress,
    Hold,
    Done,
}

impl TicketStatus {
    /// All statuses in lane display order
    pub const ALL: [TicketStatus; 4] = [Self::Todo, Self::InProgress, Self::Hold, Self::Done];

    /// Wire representation (todo, inprogress, hold, done)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Hold => "hold",
            Self::Done => "done",
        }
    }

    /// Position of this status' lane on the board
    pub fn lane_index(&self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Hold => 2,
            Self::Done => 3,
        }
    }
}

impl FromStr for TicketStatus {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "hold" => Ok(Self::Hold),
            "done" => Ok(Self::Done),
            _ => Err(BoardError::Validation(format!(
                "Invalid status '{}'. Valid statuses: todo, inprogress, hold, done",
                s
            ))),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "Todo"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Hold => write!(f, "Hold"),
            Self::Done => write!(f, "Done"),
        }
    }
}

/// Priority of a ticket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for TicketPriority {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(BoardError::Validation(format!(
                "Invalid priority '{}'. Valid priorities: high, medium, low",
                s
            ))),
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Ordered set of tags
///
/// Insertion trims the tag and ignores blanks and duplicates, so the first
/// occurrence wins and order of insertion is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    const DELIMITER: &'static str = ",";

    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts a tag, returning false if it was blank or already present
    pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the comma-delimited form used by backing stores
    pub fn from_delimited(s: &str) -> Self {
        s.split(Self::DELIMITER).collect()
    }

    /// Renders the comma-delimited form used by backing stores
    pub fn to_delimited(&self) -> String {
        self.0.join(Self::DELIMITER)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}

/// The complete set of user-editable ticket attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFields {
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub tags: Tags,
    pub assignee: String,
}

impl TicketFields {
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(BoardError::validation("title is required"));
    }
    Ok(())
}

/// Input for creating a ticket; missing fields are resolved from [`FieldDefaults`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TicketDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Validates the draft and fills in defaults
    pub fn resolve(self, defaults: &FieldDefaults) -> Result<TicketFields> {
        validate_title(&self.title)?;

        Ok(TicketFields {
            title: self.title.trim().to_string(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or(defaults.status),
            priority: self.priority.unwrap_or(defaults.priority),
            tags: self.tags.into_iter().collect(),
            assignee: defaults.assignee_or_default(self.assignee.as_deref()),
        })
    }
}

/// Partial edit of a ticket; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl TicketPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TicketPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merges the patch over `current`, validating the result
    pub fn apply_to(&self, current: &TicketFields, defaults: &FieldDefaults) -> Result<TicketFields> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }

        let fields = TicketFields {
            title: self
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| current.description.clone()),
            status: self.status.unwrap_or(current.status),
            priority: self.priority.unwrap_or(current.priority),
            tags: self
                .tags
                .as_ref()
                .map(|tags| tags.iter().collect())
                .unwrap_or_else(|| current.tags.clone()),
            assignee: match &self.assignee {
                Some(assignee) => defaults.assignee_or_default(Some(assignee)),
                None => current.assignee.clone(),
            },
        };

        fields.validate()?;
        Ok(fields)
    }
}

/// A ticket on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    #[serde(default)]
    pub tags: Tags,
    pub assignee: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates a ticket with the given ID and attributes, stamped now
    pub fn new(id: TicketId, fields: TicketFields) -> Self {
        Self::new_at(id, fields, Utc::now())
    }

    pub fn new_at(id: TicketId, fields: TicketFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            tags: fields.tags,
            assignee: fields.assignee,
            created_at: now,
            updated_at: now,
        }
    }

    /// Snapshot of the editable attributes
    pub fn fields(&self) -> TicketFields {
        TicketFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            tags: self.tags.clone(),
            assignee: self.assignee.clone(),
        }
    }

    /// Overwrites the editable attributes, keeping identity and creation time
    pub fn apply_fields(&mut self, fields: TicketFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.status = fields.status;
        self.priority = fields.priority;
        self.tags = fields.tags;
        self.assignee = fields.assignee;
        self.touch();
    }

    /// Changes the ticket status
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    /// Refreshes `updated_at`, never letting it fall behind `created_at`
    pub fn touch_at(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
