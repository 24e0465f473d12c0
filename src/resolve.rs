//! Board and column resolution for column edits.
//!
//! | boards the task is on | hint | board used                         |
//! |-----------------------|------|------------------------------------|
//! | 0                     | no   | error: not on any board            |
//! | 1                     | no   | that board                         |
//! | >1                    | no   | error: ambiguous, lists the boards |
//! | any                   | yes  | the hinted board; added if absent  |

use serde::Serialize;

use crate::error::ValidationError;
use crate::ladder::{ColumnSequence, Step, Topology};
use crate::task::TaskRecord;

/// Requested column: a name on the board, or one step along it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnTarget {
    Named(String),
    Forward,
    Backward,
}

impl ColumnTarget {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("forward") {
            ColumnTarget::Forward
        } else if input.eq_ignore_ascii_case("backward") {
            ColumnTarget::Backward
        } else {
            ColumnTarget::Named(input.to_string())
        }
    }
}

impl std::fmt::Display for ColumnTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnTarget::Named(name) => f.write_str(name),
            ColumnTarget::Forward => f.write_str("forward"),
            ColumnTarget::Backward => f.write_str("backward"),
        }
    }
}

/// Where a column edit lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnResolution {
    pub board: String,
    pub column: String,
    /// Column the task occupies on `board` today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    /// The task is not on `board` yet and will be added to it.
    pub adds_to_board: bool,
}

impl ColumnResolution {
    /// Whether applying the resolution changes anything.
    pub fn is_change(&self) -> bool {
        self.current.as_deref() != Some(self.column.as_str())
    }
}

/// Pick the board a column edit applies to.
pub fn select_board<'t>(
    task: &TaskRecord,
    hint: Option<&str>,
    topology: &'t Topology,
) -> Result<(&'t str, &'t ColumnSequence), ValidationError> {
    let name = match hint {
        Some(hint) => hint.trim().to_string(),
        None => match task.boards().as_slice() {
            [] => return Err(ValidationError::NotOnAnyBoard),
            [only] => only.to_string(),
            many => {
                return Err(ValidationError::Ambiguous {
                    boards: many.iter().map(|board| board.to_string()).collect(),
                })
            }
        },
    };

    topology
        .find_board(&name)
        .ok_or(ValidationError::UnknownBoard { board: name })
}

/// Resolve a column target for `task`, honouring an optional board hint.
pub fn resolve_column(
    task: &TaskRecord,
    target: &ColumnTarget,
    hint: Option<&str>,
    topology: &Topology,
) -> Result<ColumnResolution, ValidationError> {
    let (board, columns) = select_board(task, hint, topology)?;
    let current = current_column(task, board);
    let unknown = |column: &str| ValidationError::UnknownColumn {
        board: board.to_string(),
        column: column.to_string(),
        choices: columns.names(),
    };

    let index = match (target, current) {
        (ColumnTarget::Named(name), _) => columns.index_of(name).ok_or_else(|| unknown(name))?,
        (ColumnTarget::Forward | ColumnTarget::Backward, Some(current)) => {
            let index = columns.index_of(current).ok_or_else(|| unknown(current))?;
            let step = if *target == ColumnTarget::Forward {
                Step::Up
            } else {
                Step::Down
            };
            columns.step(index, step)
        }
        // Stepping onto a board the task is not on starts at its first column.
        (_, None) if !columns.is_empty() => 0,
        (_, None) => return Err(unknown(&target.to_string())),
    };

    let column = columns
        .name(index)
        .ok_or_else(|| unknown(&target.to_string()))?
        .to_string();
    Ok(ColumnResolution {
        board: board.to_string(),
        column,
        current: current.map(str::to_string),
        adds_to_board: current.is_none(),
    })
}

fn current_column<'a>(task: &'a TaskRecord, board: &str) -> Option<&'a str> {
    task.current_column(board).or_else(|| {
        task.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(board))
            .map(|(_, column)| column.as_str())
    })
}
