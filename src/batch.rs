//! All-or-nothing validation of batch edits.
//!
//! Every request in a batch is validated before any result is returned. The
//! batch is approved only when every task validates; otherwise the caller
//! gets the complete failure list (plus partition suggestions when the
//! failures are all board ambiguities) and must not apply anything.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::ladder::{Ladder, Ladders, Step, Subject, Topology};
use crate::partition::{suggest_partitions, PartitionGroup};
use crate::resolve::{resolve_column, ColumnResolution, ColumnTarget};
use crate::task::TaskRecord;

/// Requested priority: a level, or one step along the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityTarget {
    Named(String),
    Raise,
    Lower,
}

impl PriorityTarget {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("raise") {
            PriorityTarget::Raise
        } else if input.eq_ignore_ascii_case("lower") {
            PriorityTarget::Lower
        } else {
            PriorityTarget::Named(input.to_string())
        }
    }
}

/// Field changes shared by every task of a batch.
#[derive(Debug, Clone, Default)]
pub struct FieldChanges {
    pub priority: Option<PriorityTarget>,
    pub status: Option<String>,
    /// Board the column target applies to; ignored without a column target.
    pub board: Option<String>,
    pub column: Option<ColumnTarget>,
    pub assignee: Option<String>,
    pub comment: Option<String>,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.status.is_none()
            && self.column.is_none()
            && self.assignee.is_none()
            && self.comment.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct EditRequest {
    pub task_id: String,
    pub changes: FieldChanges,
}

impl EditRequest {
    pub fn new(task_id: impl Into<String>, changes: FieldChanges) -> Self {
        Self {
            task_id: task_id.into(),
            changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueChange {
    pub from: String,
    pub to: String,
}

/// The effective edits for one task: only fields whose target differs from
/// the current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedChangeSet {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ValueChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ValueChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ApprovedChangeSet {
    fn new(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            priority: None,
            status: None,
            column: None,
            assignee: None,
            comment: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.status.is_none()
            && self.column.is_none()
            && self.assignee.is_none()
            && self.comment.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    pub task_id: String,
    pub message: String,
    pub error: ValidationError,
}

impl TaskFailure {
    pub fn new(task_id: impl Into<String>, error: ValidationError) -> Self {
        Self {
            task_id: task_id.into(),
            message: error.to_string(),
            error,
        }
    }
}

/// A rejected batch: every failure (a task may have several), and how to
/// split the batch when all failures are board ambiguities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchError {
    pub failures: Vec<TaskFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partitions: Vec<PartitionGroup>,
}

impl BatchError {
    pub fn new(failures: Vec<TaskFailure>) -> Self {
        let partitions = if failures.iter().all(|failure| failure.error.is_ambiguity()) {
            suggest_partitions(&failures)
        } else {
            Vec::new()
        };
        Self {
            failures,
            partitions,
        }
    }

    /// Number of distinct tasks that failed.
    pub fn task_count(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !seen.contains(&failure.task_id.as_str()) {
                seen.push(&failure.task_id);
            }
        }
        seen.len()
    }
}

/// Validate one request against the task's current state.
///
/// Every field is checked, so a task reports all of its problems at once.
/// The column is resolved first: a board ambiguity always leads the list.
pub fn validate_request(
    request: &EditRequest,
    task: &TaskRecord,
    topology: &Topology,
    ladders: &Ladders,
) -> Result<ApprovedChangeSet, Vec<ValidationError>> {
    let changes = &request.changes;
    let mut approved = ApprovedChangeSet::new(&task.id);
    let mut errors = Vec::new();

    match &changes.column {
        Some(target) => match resolve_column(task, target, changes.board.as_deref(), topology) {
            Ok(resolution) if resolution.is_change() => approved.column = Some(resolution),
            Ok(_) => {}
            Err(error) => errors.push(error),
        },
        None if changes.board.is_some() => {
            debug!(task = %task.id, "board hint without column target ignored");
        }
        None => {}
    }

    if let Some(target) = &changes.priority {
        match resolve_priority(target, &task.priority, &ladders.priority) {
            Ok(to) => approved.priority = value_change(&ladders.priority, &task.priority, to),
            Err(error) => errors.push(error),
        }
    }

    if let Some(status) = &changes.status {
        match canonical(&ladders.status, Subject::Status, status) {
            Ok(to) => approved.status = value_change(&ladders.status, &task.status, to),
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    if let Some(assignee) = &changes.assignee {
        if task.owner.as_deref() != Some(assignee.as_str()) {
            approved.assignee = Some(assignee.clone());
        }
    }

    approved.comment = changes
        .comment
        .as_ref()
        .filter(|comment| !comment.trim().is_empty())
        .cloned();

    Ok(approved)
}

/// Validate a whole batch. Returns the approved change-sets only when every
/// request validates.
pub fn validate_batch(
    requests: &[EditRequest],
    tasks: &[TaskRecord],
    topology: &Topology,
    ladders: &Ladders,
) -> Result<Vec<ApprovedChangeSet>, BatchError> {
    let by_id: HashMap<&str, &TaskRecord> =
        tasks.iter().map(|task| (task.id.as_str(), task)).collect();

    let mut approved = Vec::new();
    let mut failures = Vec::new();
    for request in requests {
        let outcome = match by_id.get(request.task_id.as_str()) {
            Some(task) => validate_request(request, task, topology, ladders),
            None => Err(vec![ValidationError::UnknownTask {
                task_id: request.task_id.clone(),
            }]),
        };
        match outcome {
            Ok(changes) => approved.push(changes),
            Err(errors) => {
                for error in errors {
                    warn!(task = %request.task_id, %error, "edit rejected");
                    failures.push(TaskFailure::new(request.task_id.clone(), error));
                }
            }
        }
    }

    debug!(
        requested = requests.len(),
        approved = approved.len(),
        failed = failures.len(),
        "batch validated"
    );
    if failures.is_empty() {
        Ok(approved)
    } else {
        Err(BatchError::new(failures))
    }
}

fn canonical<'l>(ladder: &'l Ladder, field: Subject, value: &str) -> Result<&'l str, ValidationError> {
    ladder
        .canonical(value)
        .ok_or_else(|| ValidationError::UnknownValue {
            field,
            value: value.to_string(),
            choices: ladder.choices(),
        })
}

fn resolve_priority<'l>(
    target: &PriorityTarget,
    current: &str,
    ladder: &'l Ladder,
) -> Result<&'l str, ValidationError> {
    let step = match target {
        PriorityTarget::Named(name) => return canonical(ladder, Subject::Priority, name),
        PriorityTarget::Raise => Step::Up,
        PriorityTarget::Lower => Step::Down,
    };
    ladder
        .navigate(current, step)
        .ok_or_else(|| ValidationError::UnknownValue {
            field: Subject::Priority,
            value: current.to_string(),
            choices: ladder.choices(),
        })
}

fn value_change(ladder: &Ladder, current: &str, to: &str) -> Option<ValueChange> {
    let unchanged = match (ladder.position(current), ladder.position(to)) {
        (Some(a), Some(b)) => a == b,
        _ => current == to,
    };
    (!unchanged).then(|| ValueChange {
        from: current.to_string(),
        to: to.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> Topology {
        Topology::new()
            .with_board("A", &["Todo", "Doing", "Done"])
            .with_board("B", &["Todo", "Doing", "Done"])
    }

    fn changes() -> FieldChanges {
        FieldChanges::default()
    }

    #[test]
    fn unchanged_fields_are_omitted() {
        let task = TaskRecord::new("T1", "Open", "High").with_owner("alice");
        let request = EditRequest::new(
            "T1",
            FieldChanges {
                priority: Some(PriorityTarget::Named("high".to_string())),
                status: Some("resolved".to_string()),
                assignee: Some("alice".to_string()),
                ..changes()
            },
        );
        let approved =
            validate_request(&request, &task, &topology(), &Ladders::default()).expect("valid");
        assert_eq!(approved.priority, None);
        assert_eq!(approved.assignee, None);
        assert_eq!(
            approved.status,
            Some(ValueChange {
                from: "Open".to_string(),
                to: "Resolved".to_string()
            })
        );
    }

    #[test]
    fn raise_skips_triage_and_stops_at_top() {
        let ladders = Ladders::default();
        let raise = |priority: &str| {
            let task = TaskRecord::new("T1", "Open", priority);
            let request = EditRequest::new(
                "T1",
                FieldChanges {
                    priority: Some(PriorityTarget::parse("raise")),
                    ..changes()
                },
            );
            validate_request(&request, &task, &topology(), &ladders).expect("valid")
        };
        assert_eq!(raise("Normal").priority.map(|c| c.to), Some("High".to_string()));
        assert_eq!(
            raise("High").priority.map(|c| c.to),
            Some("Unbreak Now!".to_string())
        );
        assert_eq!(raise("Unbreak Now!").priority, None);
    }

    #[test]
    fn invalid_vocabulary_lists_choices() {
        let task = TaskRecord::new("T1", "Open", "High");
        let request = EditRequest::new(
            "T1",
            FieldChanges {
                status: Some("shipped".to_string()),
                ..changes()
            },
        );
        let errors = validate_request(&request, &task, &topology(), &Ladders::default())
            .expect_err("invalid status");
        assert_eq!(errors.len(), 1);
        match errors.into_iter().next().expect("one error") {
            ValidationError::UnknownValue { field, choices, .. } => {
                assert_eq!(field, Subject::Status);
                assert!(choices.contains(&"Resolved".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn every_field_error_is_reported_ambiguity_first() {
        let task = TaskRecord::new("T1", "Open", "High")
            .on_board("A", "Todo")
            .on_board("B", "Todo");
        let request = EditRequest::new(
            "T1",
            FieldChanges {
                status: Some("shipped".to_string()),
                column: Some(ColumnTarget::Forward),
                ..changes()
            },
        );
        let errors = validate_request(&request, &task, &topology(), &Ladders::default())
            .expect_err("rejected");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].is_ambiguity());
        assert!(matches!(
            errors[1],
            ValidationError::UnknownValue { field: Subject::Status, .. }
        ));

        let err = validate_batch(&[request], &[task], &topology(), &Ladders::default())
            .expect_err("batch rejected");
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.task_count(), 1);
        assert!(err.partitions.is_empty());
    }

    #[test]
    fn one_ambiguous_task_rejects_the_whole_batch() {
        let tasks = vec![
            TaskRecord::new("T1", "Open", "Normal").on_board("A", "Todo"),
            TaskRecord::new("T2", "Open", "Normal")
                .on_board("A", "Todo")
                .on_board("B", "Todo"),
            TaskRecord::new("T3", "Open", "Normal").on_board("B", "Doing"),
        ];
        let shared = FieldChanges {
            column: Some(ColumnTarget::Forward),
            ..changes()
        };
        let requests: Vec<EditRequest> = tasks
            .iter()
            .map(|task| EditRequest::new(task.id.clone(), shared.clone()))
            .collect();

        let err = validate_batch(&requests, &tasks, &topology(), &Ladders::default())
            .expect_err("batch rejected");
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].task_id, "T2");
        assert_eq!(err.partitions.len(), 1);
        assert_eq!(err.partitions[0].task_ids, vec!["T2".to_string()]);
    }

    #[test]
    fn all_failures_are_collected() {
        let tasks = vec![TaskRecord::new("T1", "Open", "Normal")];
        let requests = vec![
            EditRequest::new(
                "T1",
                FieldChanges {
                    column: Some(ColumnTarget::Forward),
                    ..changes()
                },
            ),
            EditRequest::new("T99", changes()),
        ];
        let err = validate_batch(&requests, &tasks, &topology(), &Ladders::default())
            .expect_err("batch rejected");
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].error, ValidationError::NotOnAnyBoard);
        assert!(err.partitions.is_empty());
    }

    #[test]
    fn clean_batch_is_approved() {
        let tasks = vec![
            TaskRecord::new("T1", "Open", "Normal").on_board("A", "Todo"),
            TaskRecord::new("T2", "Open", "Normal")
                .on_board("A", "Todo")
                .on_board("B", "Done"),
        ];
        let shared = FieldChanges {
            board: Some("B".to_string()),
            column: Some(ColumnTarget::Named("Done".to_string())),
            comment: Some("moving along".to_string()),
            ..changes()
        };
        let requests: Vec<EditRequest> = tasks
            .iter()
            .map(|task| EditRequest::new(task.id.clone(), shared.clone()))
            .collect();

        let approved = validate_batch(&requests, &tasks, &topology(), &Ladders::default())
            .expect("approved");
        assert_eq!(approved.len(), 2);
        let added = approved[0].column.as_ref().expect("column change");
        assert!(added.adds_to_board);
        assert_eq!(approved[1].column, None);
        assert_eq!(approved[1].comment.as_deref(), Some("moving along"));
    }
}
