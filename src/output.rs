//! Shared output formatting for tasktrail CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "tasktrail.v1";

/// How a command reports: a JSON envelope on stdout, human text, or nothing.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

const DETAILS: usize = 0;
const WARNINGS: usize = 1;
const NEXT_STEPS: usize = 2;
const SECTION_TITLES: [&str; 3] = ["Details", "Warnings", "Next steps"];

/// Human report: a header line, `key: value` summary pairs and the
/// details/warnings/next-steps lists. Warnings and next steps also travel
/// in the JSON envelope.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    sections: [Vec<String>; 3],
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            sections: Default::default(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.sections[DETAILS].push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.sections[WARNINGS].push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.sections[NEXT_STEPS].push(value.into());
    }
}

/// `{schema_version, command, status, <body>, warnings?, next_steps?}`
#[derive(Serialize)]
struct Envelope<'a, B: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    body: B,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

#[derive(Serialize)]
struct SuccessBody<'a, T: Serialize> {
    data: &'a T,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorReport,
}

#[derive(Serialize)]
struct ErrorReport {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl<'a, B: Serialize> Envelope<'a, B> {
    fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Report a command's result: `data` in JSON mode, `human` otherwise.
pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let section = |index: usize| human.map(|h| h.sections[index].clone()).unwrap_or_default();
        return Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            body: SuccessBody { data },
            warnings: section(WARNINGS),
            next_steps: section(NEXT_STEPS),
        }
        .print();
    }

    match human {
        Some(human) if !options.quiet => println!("{}", format_human(human)),
        _ => {}
    }
    Ok(())
}

/// Report a failed command: JSON on stdout, human text on stderr.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if !json {
        eprintln!("{}", format_error(err));
        return Ok(());
    }

    Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        body: ErrorBody {
            error: ErrorReport {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            },
        },
        warnings: Vec::new(),
        next_steps: error_next_steps(err),
    }
    .print()
}

/// Human rendering of an error, including the per-task report and
/// partition suggestions of a rejected batch.
pub fn format_error(err: &Error) -> String {
    let mut lines = vec![format!("error: {err}")];

    let Error::BatchRejected(batch) = err else {
        if let Some(hint) = error_next_steps(err).first() {
            lines.push(format!("hint: {hint}"));
        }
        return lines.join("\n");
    };

    for failure in &batch.failures {
        lines.push(format!("  - {}: {}", failure.task_id, failure.message));
    }
    if !batch.partitions.is_empty() {
        lines.push(String::new());
        lines.push("Suggested partition commands:".to_string());
        for group in &batch.partitions {
            lines.push(String::new());
            lines.push(format!("# Tasks on {}:", group.boards.join(" + ")));
            lines.push(group.command());
        }
    }
    lines.join("\n")
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    if !output.summary.is_empty() {
        lines.push(String::new());
        lines.push("Summary:".to_string());
        lines.extend(output.summary.iter().map(|(key, value)| match value.as_str() {
            "" => format!("- {key}"),
            value => format!("- {key}: {value}"),
        }));
    }

    for (title, items) in SECTION_TITLES.iter().zip(&output.sections) {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{title}:"));
        lines.extend(items.iter().map(|item| format!("- {item}")));
    }

    lines.join("\n")
}

/// First positional argument, skipping the value of `--config`.
pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "tasktrail".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "batch_rejected",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::BatchRejected(batch) if !batch.partitions.is_empty() => batch
            .partitions
            .iter()
            .map(|group| group.command())
            .collect(),
        Error::BatchRejected(_) => {
            vec!["fix the listed tasks, then rerun the whole batch".to_string()]
        }
        Error::Parse(_) => vec!["patterns look like in:Done or from:Doing:backward+not:in:QA".to_string()],
        Error::SnapshotNotFound(_) => vec!["tasktrail search --snapshot <file.json>".to_string()],
        Error::InvalidConfig(_) => vec!["fix .tasktrail.toml then retry".to_string()],
        _ => Vec::new(),
    }
}
