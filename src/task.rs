//! Task records as delivered by the tracker.
//!
//! A task carries its live field values (status, priority, owner, the column
//! it currently occupies on each board) and the raw, possibly unordered,
//! transaction feed those values were reached through.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ladder::Subject;

/// Field a feed entry changed. The tracker reports many more fields than
/// tasktrail reads; those all land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Column,
    Priority,
    Status,
    #[serde(other)]
    Other,
}

impl FieldKind {
    pub fn subject(self) -> Option<Subject> {
        match self {
            FieldKind::Column => Some(Subject::Column),
            FieldKind::Priority => Some(Subject::Priority),
            FieldKind::Status => Some(Subject::Status),
            FieldKind::Other => None,
        }
    }
}

impl From<Subject> for FieldKind {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Column => FieldKind::Column,
            Subject::Priority => FieldKind::Priority,
            Subject::Status => FieldKind::Status,
        }
    }
}

/// One raw entry of a task's transaction feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionEvent {
    pub timestamp: DateTime<Utc>,
    pub field: FieldKind,
    /// Board the column change happened on. Required for column events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<String>,
}

impl TransactionEvent {
    pub fn new(timestamp: DateTime<Utc>, field: impl Into<FieldKind>) -> Self {
        Self {
            timestamp,
            field: field.into(),
            board: None,
            old: None,
            new: None,
        }
    }

    pub fn column(
        timestamp: DateTime<Utc>,
        board: impl Into<String>,
        old: Option<&str>,
        new: impl Into<String>,
    ) -> Self {
        Self {
            board: Some(board.into()),
            old: old.map(str::to_string),
            new: Some(new.into()),
            ..Self::new(timestamp, Subject::Column)
        }
    }

    pub fn priority(timestamp: DateTime<Utc>, old: Option<&str>, new: impl Into<String>) -> Self {
        Self {
            old: old.map(str::to_string),
            new: Some(new.into()),
            ..Self::new(timestamp, Subject::Priority)
        }
    }

    pub fn status(timestamp: DateTime<Utc>, old: Option<&str>, new: impl Into<String>) -> Self {
        Self {
            old: old.map(str::to_string),
            new: Some(new.into()),
            ..Self::new(timestamp, Subject::Status)
        }
    }
}

/// Live state of a task plus its raw history feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub status: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Board name to the column the task currently sits in.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<TransactionEvent>,
}

impl TaskRecord {
    pub fn new(
        id: impl Into<String>,
        status: impl Into<String>,
        priority: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: String::new(),
            status: status.into(),
            priority: priority.into(),
            owner: None,
            created_at: now,
            updated_at: now,
            columns: BTreeMap::new(),
            transactions: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn on_board(mut self, board: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(board.into(), column.into());
        self
    }

    pub fn with_event(mut self, event: TransactionEvent) -> Self {
        self.transactions.push(event);
        self
    }

    /// Boards the task is attached to, alphabetically.
    pub fn boards(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn current_column(&self, board: &str) -> Option<&str> {
        self.columns.get(board).map(String::as_str)
    }
}

/// Normalize a task reference: `T123`, `t123`, `123` or a URL ending in a
/// `T123` monogram all become `T123`.
pub fn parse_task_ref(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return Some(format!("T{trimmed}"));
    }

    let bytes = trimmed.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if !matches!(byte, b'T' | b't') {
            continue;
        }
        let preceded_by_word = index > 0 && bytes[index - 1].is_ascii_alphanumeric();
        if preceded_by_word {
            continue;
        }
        let digits: String = trimmed[index + 1..]
            .chars()
            .take_while(|ch| ch.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            return Some(format!("T{digits}"));
        }
    }
    None
}

/// Sort key that orders `T9` before `T10`.
pub fn task_sort_key(id: &str) -> (u64, &str) {
    let numeric = id
        .trim_start_matches(['T', 't'])
        .parse::<u64>()
        .unwrap_or(u64::MAX);
    (numeric, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_monograms() {
        assert_eq!(parse_task_ref("T123").as_deref(), Some("T123"));
        assert_eq!(parse_task_ref("t42").as_deref(), Some("T42"));
        assert_eq!(parse_task_ref(" 7 ").as_deref(), Some("T7"));
        assert_eq!(
            parse_task_ref("https://tracker.example.com/T456").as_deref(),
            Some("T456")
        );
        assert_eq!(parse_task_ref("K12"), None);
        assert_eq!(parse_task_ref("PT12"), None);
        assert_eq!(parse_task_ref(""), None);
    }

    #[test]
    fn sort_key_orders_numerically() {
        let mut ids = vec!["T10", "T9", "T100", "misc"];
        ids.sort_by_key(|id| task_sort_key(id));
        assert_eq!(ids, vec!["T9", "T10", "T100", "misc"]);
    }

    #[test]
    fn builder_tracks_boards() {
        let task = TaskRecord::new("T1", "Open", "Normal")
            .on_board("QA", "Review")
            .on_board("Dev", "Done");
        assert_eq!(task.boards(), vec!["Dev", "QA"]);
        assert_eq!(task.current_column("QA"), Some("Review"));
        assert_eq!(task.current_column("Ops"), None);
    }
}
