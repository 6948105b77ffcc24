use crate::{
    domain::ticket::{TicketPriority, TicketStatus},
    error::{BoardError, Result},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field defaults applied uniformly by the create and edit paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefaults {
    #[serde(default = "default_assignee")]
    pub assignee: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub status: TicketStatus,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            assignee: default_assignee(),
            priority: TicketPriority::default(),
            status: TicketStatus::default(),
        }
    }
}

impl FieldDefaults {
    /// Resolves an optional assignee, falling back to the default when missing or blank
    pub fn assignee_or_default(&self, assignee: Option<&str>) -> String {
        match assignee.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.assignee.clone(),
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default)]
    pub seed_demo_data: bool,
    #[serde(default)]
    pub defaults: FieldDefaults,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            seed_demo_data: false,
            defaults: FieldDefaults::default(),
        }
    }
}

impl BoardConfig {
    /// Parses a configuration document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BoardError::ConfigError(e.to_string()))
    }

    /// Loads the configuration at `path`, returning defaults when the file is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| BoardError::ConfigError(format!("{}: {}", path.display(), e)))
    }
}

fn default_assignee() -> String {
    "Jacob".to_string()
}

fn default_board_name() -> String {
    "Trading Board".to_string()
}
