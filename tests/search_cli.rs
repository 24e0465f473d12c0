mod support;

use predicates::str::contains;
use support::{sample_snapshot, stdout_json, TestTracker};

#[test]
fn column_pattern_finds_reopened_task() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    let output = tracker
        .command()
        .args(["--json", "search", "--snapshot"])
        .arg(&snapshot)
        .args(["--column", "from:Done:backward"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let payload = stdout_json(&output);
    assert_eq!(payload["schema_version"], "tasktrail.v1");
    assert_eq!(payload["command"], "search");
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["scanned"], 4);
    assert_eq!(payload["data"]["tasks"][0]["id"], "T1");
    assert_eq!(payload["data"]["tasks"][0]["matched_boards"][0], "Dev");
}

#[test]
fn matched_boards_only_lists_satisfying_boards() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    let output = tracker
        .command()
        .args(["--json", "search", "--snapshot"])
        .arg(&snapshot)
        .args(["--column", "in:Done+never:InReview"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let payload = stdout_json(&output);
    let tasks = payload["data"]["tasks"].as_array().expect("tasks");
    let ids: Vec<&str> = tasks.iter().filter_map(|t| t["id"].as_str()).collect();
    assert_eq!(ids, vec!["T2", "T4"]);
    assert_eq!(tasks[0]["matched_boards"], serde_json::json!(["Dev"]));
}

#[test]
fn dimensions_combine_with_and() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    let output = tracker
        .command()
        .args(["--json", "search", "--snapshot"])
        .arg(&snapshot)
        .args(["--column", "in:Done", "--priority", "raised", "--text", "checkout"])
        .output()
        .expect("run");
    let payload = stdout_json(&output);
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["tasks"][0]["id"], "T2");
    assert_eq!(payload["data"]["tasks"][0]["matched_priority"], true);
}

#[test]
fn tag_pattern_limits_boards() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    let output = tracker
        .command()
        .args(["--json", "search", "--snapshot"])
        .arg(&snapshot)
        .args(["--tag", "dev+o*"])
        .output()
        .expect("run");
    let payload = stdout_json(&output);
    assert_eq!(payload["data"]["total"], 1);
    assert_eq!(payload["data"]["tasks"][0]["id"], "T4");
}

#[test]
fn human_output_lists_matches() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    tracker
        .command()
        .args(["search", "--snapshot"])
        .arg(&snapshot)
        .args(["--column", "in:Backlog"])
        .assert()
        .success()
        .stdout(contains("tasktrail search: 2 of 4 task(s) matched"))
        .stdout(contains("- column: in:Backlog"))
        .stdout(contains("T3 [Open] Export CSV"));
}

#[test]
fn invalid_pattern_is_a_user_error() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());

    tracker
        .command()
        .args(["search", "--snapshot"])
        .arg(&snapshot)
        .args(["--column", "to:Done:forward"])
        .assert()
        .code(2)
        .stderr(contains("Direction modifier only allowed for 'from' patterns"));

    tracker
        .command()
        .args(["search", "--snapshot"])
        .arg(&snapshot)
        .args(["--priority", "forward"])
        .assert()
        .code(2)
        .stderr(contains("does not apply to priority patterns"));
}

#[test]
fn missing_snapshot_is_reported() {
    let tracker = TestTracker::new();
    let output = tracker
        .command()
        .args(["--json", "search", "--snapshot", "nope.json"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let payload = stdout_json(&output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error"]["kind"], "user_error");
}

#[test]
fn config_workers_are_validated() {
    let tracker = TestTracker::new();
    let snapshot = tracker.write_snapshot(&sample_snapshot());
    tracker.write_config("[search]\nworkers = 500\n");

    tracker
        .command()
        .args(["search", "--snapshot"])
        .arg(&snapshot)
        .assert()
        .code(2)
        .stderr(contains("search.workers"));
}
