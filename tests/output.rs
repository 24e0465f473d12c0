use tasktrail::batch::{BatchError, TaskFailure};
use tasktrail::error::{Error, ValidationError};
use tasktrail::output::{format_error, format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("tasktrail search: 1 of 3 task(s) matched");
    human.push_summary("column", "in:Done");
    human.push_detail("T1 [Open] Login");
    human.push_warning("no filters given; every task matches");
    human.push_next_step("tasktrail edit T1 --column forward");

    let rendered = format_human(&human);
    assert!(rendered.contains("tasktrail search: 1 of 3 task(s) matched"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- column: in:Done"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- T1 [Open] Login"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- tasktrail edit T1 --column forward"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("tasktrail edit: 0 change-set(s) approved");
    let rendered = format_human(&human);
    assert_eq!(rendered, "tasktrail edit: 0 change-set(s) approved");
}

#[test]
fn format_error_renders_partition_suggestions() {
    let err = Error::from(BatchError::new(vec![
        TaskFailure::new(
            "T1",
            ValidationError::Ambiguous {
                boards: vec!["Dev".to_string(), "QA".to_string()],
            },
        ),
        TaskFailure::new(
            "T2",
            ValidationError::Ambiguous {
                boards: vec!["Dev".to_string(), "QA".to_string()],
            },
        ),
    ]));

    let rendered = format_error(&err);
    assert!(rendered.starts_with("error: Validation failed for 2 task(s)"));
    assert!(rendered.contains("  - T1: Task is on multiple boards (Dev, QA); specify --board"));
    assert!(rendered.contains("Suggested partition commands:"));
    assert!(rendered.contains("# Tasks on Dev + QA:"));
    assert!(rendered.contains("tasktrail edit --board=\"Dev\" --column=COLUMN T1 T2"));
}

#[test]
fn format_error_adds_hint_for_other_errors() {
    let err = Error::InvalidConfig("search.workers must be between 1 and 64".to_string());
    let rendered = format_error(&err);
    assert!(rendered.contains("hint: fix .tasktrail.toml then retry"));
}
