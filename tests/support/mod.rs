#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A scratch directory holding a tracker snapshot and optional config.
pub struct TestTracker {
    dir: TempDir,
}

impl TestTracker {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_snapshot(&self, snapshot: &Value) -> PathBuf {
        let contents = serde_json::to_string_pretty(snapshot).expect("serialize snapshot");
        self.write_file("snapshot.json", &contents)
            .expect("write snapshot")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        self.write_file(".tasktrail.toml", contents)
            .expect("write config")
    }

    /// `tasktrail` running inside the scratch directory.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("tasktrail").expect("binary");
        cmd.current_dir(self.path());
        cmd.env_remove("TASKTRAIL_CONFIG");
        cmd.env_remove("TASKTRAIL_SNAPSHOT");
        cmd
    }
}

pub fn column(board: &str, ts: &str, old: &str, new: &str) -> Value {
    json!({"timestamp": ts, "field": "column", "board": board, "old": old, "new": new})
}

pub fn priority(ts: &str, old: &str, new: &str) -> Value {
    json!({"timestamp": ts, "field": "priority", "old": old, "new": new})
}

pub fn task(id: &str, title: &str, columns: Value, transactions: Vec<Value>) -> Value {
    json!({
        "id": id,
        "title": title,
        "status": "Open",
        "priority": "Normal",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-02-01T00:00:00Z",
        "columns": columns,
        "transactions": transactions,
    })
}

/// Dev and QA boards; T1 reopened on Dev, T2 on both boards, T3 on Dev only,
/// T4 on Dev and Ops.
pub fn sample_snapshot() -> Value {
    let columns = json!([
        {"name": "Backlog", "sequence": 0},
        {"name": "InProgress", "sequence": 10},
        {"name": "InReview", "sequence": 20},
        {"name": "Done", "sequence": 30}
    ]);
    json!({
        "boards": [
            {"name": "Dev", "columns": columns},
            {"name": "QA", "columns": columns},
            {"name": "Ops", "columns": columns}
        ],
        "tasks": [
            task("T1", "Login redirect loops", json!({"Dev": "InProgress"}), vec![
                column("Dev", "2024-01-03T00:00:00Z", "Done", "InProgress"),
                column("Dev", "2024-01-01T00:00:00Z", "Backlog", "InProgress"),
                column("Dev", "2024-01-02T00:00:00Z", "InProgress", "Done"),
            ]),
            task("T2", "Checkout totals", json!({"Dev": "Done", "QA": "InReview"}), vec![
                column("Dev", "2024-01-01T00:00:00Z", "Backlog", "Done"),
                column("QA", "2024-01-02T00:00:00Z", "Backlog", "InReview"),
                priority("2024-01-04T00:00:00Z", "Normal", "High"),
            ]),
            task("T3", "Export CSV", json!({"Dev": "Backlog"}), vec![]),
            task("T4", "Rotate keys", json!({"Dev": "Done", "Ops": "Backlog"}), vec![]),
        ]
    })
}

pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json stdout")
}
