//! Task selection across column, priority, status, text, tag and date filters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::evaluate::{evaluate_pattern, Track};
use crate::history::TaskHistory;
use crate::ladder::{Ladders, Subject, Topology};
use crate::pattern::{parse_pattern_for, ParseError, Pattern};
use crate::tags::TagPattern;
use crate::task::{task_sort_key, TaskRecord};

/// The filter dimensions a caller supplied. Omitted dimensions always pass.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub column: Option<Pattern>,
    pub priority: Option<Pattern>,
    pub status: Option<Pattern>,
    pub text: Option<String>,
    pub tags: Option<TagPattern>,
    pub updated_after: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, input: &str) -> std::result::Result<Self, ParseError> {
        self.column = Some(parse_pattern_for(Subject::Column, input)?);
        Ok(self)
    }

    pub fn with_priority(mut self, input: &str) -> std::result::Result<Self, ParseError> {
        self.priority = Some(parse_pattern_for(Subject::Priority, input)?);
        Ok(self)
    }

    pub fn with_status(mut self, input: &str) -> std::result::Result<Self, ParseError> {
        self.status = Some(parse_pattern_for(Subject::Status, input)?);
        Ok(self)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_tags(mut self, tags: TagPattern) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.column.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.text.is_none()
            && self.tags.is_none()
            && self.updated_after.is_none()
            && self.created_after.is_none()
    }
}

/// Outcome of filtering one task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    /// Boards whose column history satisfied the column pattern, alphabetically.
    pub matched_boards: Vec<String>,
    pub matched_priority: bool,
    pub matched_status: bool,
}

/// A selected task with the facts a search listing shows.
#[derive(Debug, Clone, Serialize)]
pub struct TaskMatch {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub columns: BTreeMap<String, String>,
    #[serde(flatten)]
    pub result: MatchResult,
}

impl TaskMatch {
    fn new(task: &TaskRecord, result: MatchResult) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status.clone(),
            priority: task.priority.clone(),
            columns: task.columns.clone(),
            result,
        }
    }
}

/// Decide whether a task satisfies every supplied dimension.
pub fn match_task(
    task: &TaskRecord,
    history: &TaskHistory,
    criteria: &FilterCriteria,
    ladders: &Ladders,
) -> MatchResult {
    let mut result = MatchResult::default();
    let mut selected = true;

    if let Some(tags) = &criteria.tags {
        selected &= tags.matches_boards(&task.boards());
    }
    if let Some(text) = &criteria.text {
        selected &= task.title.to_lowercase().contains(&text.to_lowercase());
    }
    if let Some(after) = criteria.updated_after {
        selected &= task.updated_at >= after;
    }
    if let Some(after) = criteria.created_after {
        selected &= task.created_at >= after;
    }

    if let Some(pattern) = &criteria.column {
        for board in history.boards() {
            let in_scope = criteria
                .tags
                .as_ref()
                .map_or(true, |tags| tags.names_board(&board.board));
            if !in_scope {
                continue;
            }
            let hit = evaluate_pattern(pattern, &Track::column(board));
            debug!(task = %task.id, board = %board.board, hit, "column pattern");
            if hit {
                result.matched_boards.push(board.board.clone());
            }
        }
        result.matched_boards.sort();
        selected &= !result.matched_boards.is_empty();
    }

    if let Some(pattern) = &criteria.priority {
        result.matched_priority = evaluate_pattern(pattern, &Track::priority(history, ladders));
        selected &= result.matched_priority;
    }
    if let Some(pattern) = &criteria.status {
        result.matched_status = evaluate_pattern(pattern, &Track::status(history, ladders));
        selected &= result.matched_status;
    }

    result.matched = selected;
    result
}

/// Normalize and filter every task on a pool of `workers` threads. Matches
/// come back ordered by task id.
pub fn search(
    tasks: &[TaskRecord],
    topology: &Topology,
    criteria: &FilterCriteria,
    ladders: &Ladders,
    workers: usize,
) -> Result<Vec<TaskMatch>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()?;

    let mut matches: Vec<TaskMatch> = pool.install(|| {
        tasks
            .par_iter()
            .filter_map(|task| {
                let history = TaskHistory::build(task, topology, ladders);
                let result = match_task(task, &history, criteria, ladders);
                result.matched.then(|| TaskMatch::new(task, result))
            })
            .collect()
    });
    matches.sort_by(|a, b| task_sort_key(&a.id).cmp(&task_sort_key(&b.id)));

    debug!(scanned = tasks.len(), matched = matches.len(), workers, "search finished");
    Ok(matches)
}
