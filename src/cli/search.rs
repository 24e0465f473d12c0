//! tasktrail search command implementation
//!
//! Loads a snapshot, filters its tasks and lists the matches.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::filter::{search, FilterCriteria, TaskMatch};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::snapshot::Snapshot;
use crate::tags::TagPattern;

/// Options for the search command
pub struct SearchOptions {
    pub snapshot: PathBuf,
    pub column: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub text: Option<String>,
    pub tag: Option<String>,
    pub updated_after: Option<String>,
    pub created_after: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct SearchReport {
    scanned: usize,
    total: usize,
    tasks: Vec<TaskMatch>,
}

pub fn run(options: SearchOptions) -> Result<()> {
    let config = Config::resolve(options.config.as_ref())?;
    let criteria = build_criteria(&options)?;
    let snapshot = Snapshot::load(&options.snapshot)?;
    let topology = snapshot.topology();
    let ladders = snapshot.ladders(&config);

    let tasks = search(
        &snapshot.tasks,
        &topology,
        &criteria,
        &ladders,
        config.search.workers,
    )?;

    let report = SearchReport {
        scanned: snapshot.tasks.len(),
        total: tasks.len(),
        tasks,
    };

    let mut human = HumanOutput::new(format!(
        "tasktrail search: {} of {} task(s) matched",
        report.total, report.scanned
    ));
    for (name, pattern) in [
        ("column", &criteria.column),
        ("priority", &criteria.priority),
        ("status", &criteria.status),
    ] {
        if let Some(pattern) = pattern {
            human.push_summary(name, pattern.to_string());
        }
    }
    if let Some(tags) = &criteria.tags {
        human.push_summary("tag", tags.to_string());
    }
    for task in &report.tasks {
        human.push_detail(describe(task));
    }
    if criteria.is_empty() {
        human.push_warning("no filters given; every task matches");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "search",
        &report,
        Some(&human),
    )
}

fn build_criteria(options: &SearchOptions) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new();
    if let Some(pattern) = &options.column {
        criteria = criteria.with_column(pattern)?;
    }
    if let Some(pattern) = &options.priority {
        criteria = criteria.with_priority(pattern)?;
    }
    if let Some(pattern) = &options.status {
        criteria = criteria.with_status(pattern)?;
    }
    if let Some(text) = &options.text {
        criteria = criteria.with_text(text.clone());
    }
    if let Some(tag) = &options.tag {
        criteria = criteria.with_tags(TagPattern::parse(tag)?);
    }
    criteria.updated_after = options
        .updated_after
        .as_deref()
        .map(|raw| parse_time(raw, "--updated-after"))
        .transpose()?;
    criteria.created_after = options
        .created_after
        .as_deref()
        .map(|raw| parse_time(raw, "--created-after"))
        .transpose()?;
    Ok(criteria)
}

/// Accept RFC 3339 timestamps or plain dates (midnight UTC).
fn parse_time(raw: &str, flag: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{flag}: expected RFC 3339 time or YYYY-MM-DD, got '{raw}'"
            ))
        })
}

fn describe(task: &TaskMatch) -> String {
    let columns = task
        .columns
        .iter()
        .map(|(board, column)| format!("{board}: {column}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!("{} [{}] {}", task.id, task.status, task.title);
    if !columns.is_empty() {
        line.push_str(&format!(" ({columns})"));
    }
    if !task.result.matched_boards.is_empty() {
        line.push_str(&format!(
            " matched on {}",
            task.result.matched_boards.join(", ")
        ));
    }
    line
}
