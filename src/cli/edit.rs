//! tasktrail edit command implementation
//!
//! Validates one field-change set against every named task. Either the
//! whole batch is approved (and optionally emitted as change events) or the
//! command fails with the per-task report and partition suggestions.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use crate::batch::{validate_batch, ApprovedChangeSet, EditRequest, FieldChanges, PriorityTarget};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventDestination;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::resolve::ColumnTarget;
use crate::snapshot::Snapshot;
use crate::task::parse_task_ref;

/// Options for the edit command
pub struct EditOptions {
    pub snapshot: PathBuf,
    pub tasks: Vec<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub board: Option<String>,
    pub column: Option<String>,
    pub assign: Option<String>,
    pub comment: Option<String>,
    pub dry_run: bool,
    pub events: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct EditReport {
    dry_run: bool,
    approved: Vec<ApprovedChangeSet>,
    /// Tasks that validated but need no change.
    unchanged: Vec<String>,
    events_emitted: usize,
}

pub fn run(options: EditOptions) -> Result<()> {
    let config = Config::resolve(options.config.as_ref())?;
    let changes = field_changes(&options)?;
    let task_ids = collect_task_ids(&options.tasks)?;
    let destination = EventDestination::parse(options.events.as_deref());

    let snapshot = Snapshot::load(&options.snapshot)?;
    let topology = snapshot.topology();
    let ladders = snapshot.ladders(&config);

    let requests: Vec<EditRequest> = task_ids
        .iter()
        .map(|id| EditRequest::new(id.clone(), changes.clone()))
        .collect();
    let validated = validate_batch(&requests, &snapshot.tasks, &topology, &ladders)?;

    let (approved, unchanged): (Vec<_>, Vec<_>) =
        validated.into_iter().partition(|change| !change.is_empty());
    let unchanged: Vec<String> = unchanged.into_iter().map(|change| change.task_id).collect();

    let mut events_emitted = 0;
    if let Some(destination) = &destination {
        if !options.dry_run {
            events_emitted = destination.open()?.emit_changes(&approved)?;
        }
    }

    let mut human = HumanOutput::new(if options.dry_run {
        format!("tasktrail edit (dry run): {} change-set(s) approved", approved.len())
    } else {
        format!("tasktrail edit: {} change-set(s) approved", approved.len())
    });
    human.push_summary("tasks", task_ids.len().to_string());
    human.push_summary("changed", approved.len().to_string());
    human.push_summary("unchanged", unchanged.len().to_string());
    for change in &approved {
        human.push_detail(describe(change));
    }
    if !unchanged.is_empty() {
        human.push_warning(format!("no effective change for {}", unchanged.join(", ")));
    }
    if options.dry_run && !approved.is_empty() {
        human.push_next_step("rerun without --dry-run to emit the change-sets");
    }

    let report = EditReport {
        dry_run: options.dry_run,
        approved,
        unchanged,
        events_emitted,
    };
    let events_on_stdout = matches!(destination, Some(EventDestination::Stdout));
    emit_success(
        OutputOptions {
            json: options.json && !events_on_stdout,
            quiet: options.quiet || events_on_stdout,
        },
        "edit",
        &report,
        Some(&human),
    )
}

fn field_changes(options: &EditOptions) -> Result<FieldChanges> {
    let changes = FieldChanges {
        priority: options.priority.as_deref().map(PriorityTarget::parse),
        status: options.status.clone(),
        board: options.board.clone(),
        column: options.column.as_deref().map(ColumnTarget::parse),
        assignee: options.assign.clone(),
        comment: options.comment.clone(),
    };
    if changes.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass --priority, --status, --column, --assign or --comment"
                .to_string(),
        ));
    }
    Ok(changes)
}

/// Task references from arguments, or from piped stdin when none are given.
fn collect_task_ids(args: &[String]) -> Result<Vec<String>> {
    let raw: Vec<String> = if args.is_empty() && !std::io::stdin().is_terminal() {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        input.split_whitespace().map(str::to_string).collect()
    } else {
        args.to_vec()
    };

    let mut ids = Vec::new();
    for reference in &raw {
        let id = parse_task_ref(reference).ok_or_else(|| {
            Error::InvalidArgument(format!("not a task reference: '{reference}'"))
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(Error::InvalidArgument(
            "task ID required (e.g. T123) or pipe task IDs on stdin".to_string(),
        ));
    }
    Ok(ids)
}

fn describe(change: &ApprovedChangeSet) -> String {
    let mut parts = Vec::new();
    if let Some(priority) = &change.priority {
        parts.push(format!("priority {} -> {}", priority.from, priority.to));
    }
    if let Some(status) = &change.status {
        parts.push(format!("status {} -> {}", status.from, status.to));
    }
    if let Some(column) = &change.column {
        let from = column.current.as_deref().unwrap_or("(not on board)");
        parts.push(format!("column {}: {} -> {}", column.board, from, column.column));
    }
    if let Some(assignee) = &change.assignee {
        parts.push(format!("assign {assignee}"));
    }
    if change.comment.is_some() {
        parts.push("comment".to_string());
    }
    format!("{}: {}", change.task_id, parts.join("; "))
}
