//! Tracker snapshot input.
//!
//! A snapshot is the JSON export the search and edit commands run against:
//! board topology, an optional status table and every task with its live
//! fields and raw transaction feed.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ladder::{ColumnSequence, ColumnSpec, Ladder, Ladders, Level, Topology};
use crate::task::TaskRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSpec {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// One status as the tracker reports it, in rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Machine key (`resolved`), accepted as input alongside the name.
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub boards: Vec<BoardSpec>,
    /// Overrides the configured status ladder when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<StatusEntry>>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::SnapshotNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            boards = snapshot.boards.len(),
            tasks = snapshot.tasks.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn topology(&self) -> Topology {
        let mut topology = Topology::new();
        for board in &self.boards {
            topology.insert(board.name.clone(), ColumnSequence::from_specs(&board.columns));
        }
        topology
    }

    /// Configured ladders, with the status ladder replaced by the snapshot's
    /// own table when it carries one.
    pub fn ladders(&self, config: &Config) -> Ladders {
        let mut ladders = config.ladders();
        if let Some(statuses) = &self.statuses {
            let levels = statuses
                .iter()
                .map(|entry| {
                    let mut level = Level::new(entry.name.as_str()).with_alias(entry.key.as_str());
                    level.closed = entry.closed;
                    level
                })
                .collect();
            ladders.status = Ladder::new(levels, &[]);
        }
        ladders
    }

    pub fn task(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for board in &self.boards {
            if !seen.insert(board.name.as_str()) {
                return Err(Error::OperationFailed(format!(
                    "snapshot lists board '{}' twice",
                    board.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(Error::OperationFailed(format!(
                    "snapshot lists task {} twice",
                    task.id
                )));
            }
        }

        if matches!(&self.statuses, Some(statuses) if statuses.is_empty()) {
            return Err(Error::OperationFailed(
                "snapshot status table is empty".to_string(),
            ));
        }
        Ok(())
    }
}
