//! Normalization of a raw transaction feed into ordered transition sequences.
//!
//! A [`TaskHistory`] holds one column sequence per board plus the priority and
//! status sequences. Boards live in an arena indexed by first appearance; any
//! alphabetical ordering is applied by callers as an explicit final step.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::ladder::{ColumnSequence, Direction, Ladder, Ladders, Subject, Topology};
use crate::task::{TaskRecord, TransactionEvent};

/// A single change of value, with its direction derived from the active order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    pub timestamp: DateTime<Utc>,
    /// Previous value; absent when the task was first placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    /// `None` when the move kept its rank or either end is not in the order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// Column history of a task on one board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardHistory {
    pub board: String,
    #[serde(skip)]
    pub columns: ColumnSequence,
    pub transitions: Vec<TransitionRecord>,
    /// Column the task occupies right now; `None` once it left the board.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
}

impl BoardHistory {
    fn new(board: &str, topology: &Topology) -> Self {
        let columns = match topology.board(board) {
            Some(columns) => columns.clone(),
            None => {
                debug!(board, "board missing from topology; directions unresolved");
                ColumnSequence::default()
            }
        };
        Self {
            board: board.to_string(),
            columns,
            transitions: Vec::new(),
            live: None,
        }
    }
}

/// Ordered per-subject history of one task. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct TaskHistory {
    boards: Vec<BoardHistory>,
    #[serde(skip)]
    board_index: HashMap<String, usize>,
    pub priority: Vec<TransitionRecord>,
    pub status: Vec<TransitionRecord>,
    pub live_priority: String,
    pub live_status: String,
}

impl TaskHistory {
    /// Build the history of `task` from its own transaction feed.
    pub fn build(task: &TaskRecord, topology: &Topology, ladders: &Ladders) -> Self {
        normalize(&task.transactions, task, topology, ladders)
    }

    /// Boards in arena order.
    pub fn boards(&self) -> &[BoardHistory] {
        &self.boards
    }

    pub fn board(&self, name: &str) -> Option<&BoardHistory> {
        self.board_index.get(name).map(|index| &self.boards[*index])
    }

    fn board_slot(&mut self, name: &str, topology: &Topology) -> &mut BoardHistory {
        let index = match self.board_index.get(name) {
            Some(index) => *index,
            None => {
                self.boards.push(BoardHistory::new(name, topology));
                let index = self.boards.len() - 1;
                self.board_index.insert(name.to_string(), index);
                index
            }
        };
        &mut self.boards[index]
    }
}

/// Turn a feed for one task into ordered transition sequences.
///
/// Events are stable-sorted by timestamp, so ties keep feed order. Entries
/// for other fields, entries without a new value, and column entries without
/// a board are skipped.
/// Every board the task currently sits on gets a history, even without any
/// transitions, so its live column stays matchable.
pub fn normalize(
    events: &[TransactionEvent],
    task: &TaskRecord,
    topology: &Topology,
    ladders: &Ladders,
) -> TaskHistory {
    let mut ordered: Vec<&TransactionEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp);

    let mut history = TaskHistory {
        boards: Vec::new(),
        board_index: HashMap::new(),
        priority: Vec::new(),
        status: Vec::new(),
        live_priority: task.priority.clone(),
        live_status: task.status.clone(),
    };

    for event in ordered {
        let Some(subject) = event.field.subject() else {
            warn!(task = %task.id, "skipping transaction of an untracked field");
            continue;
        };
        let Some(to) = event.new.as_deref() else {
            warn!(task = %task.id, field = %subject, "skipping transaction without new value");
            continue;
        };

        match subject {
            Subject::Column => {
                let Some(board) = event.board.as_deref() else {
                    warn!(task = %task.id, "skipping column transaction without board");
                    continue;
                };
                let slot = history.board_slot(board, topology);
                let direction = event
                    .old
                    .as_deref()
                    .and_then(|from| slot.columns.direction(from, to));
                slot.transitions.push(record(event, to, direction));
            }
            Subject::Priority => {
                let direction = ranked_direction(&ladders.priority, Subject::Priority, event, to);
                history.priority.push(record(event, to, direction));
            }
            Subject::Status => {
                let direction = ranked_direction(&ladders.status, Subject::Status, event, to);
                history.status.push(record(event, to, direction));
            }
        }
    }

    for (board, column) in &task.columns {
        history.board_slot(board, topology).live = Some(column.clone());
    }

    debug!(
        task = %task.id,
        boards = history.boards.len(),
        priority = history.priority.len(),
        status = history.status.len(),
        "normalized history"
    );
    history
}

fn ranked_direction(
    ladder: &Ladder,
    subject: Subject,
    event: &TransactionEvent,
    to: &str,
) -> Option<Direction> {
    let from = event.old.as_deref()?;
    ladder
        .compare(from, to)
        .and_then(|ordering| subject.direction_for(ordering))
}

fn record(event: &TransactionEvent, to: &str, direction: Option<Direction>) -> TransitionRecord {
    TransitionRecord {
        timestamp: event.timestamp,
        from: event.old.clone(),
        to: to.to_string(),
        direction,
    }
}
