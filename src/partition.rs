//! Splitting an ambiguous batch into sub-batches that each validate.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::batch::TaskFailure;
use crate::error::ValidationError;

/// Tasks that all resolve once `board` is given as the board hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionGroup {
    pub board: String,
    /// Every board any task of the group sits on.
    pub boards: Vec<String>,
    pub task_ids: Vec<String>,
}

impl PartitionGroup {
    /// Command line that re-runs the edit for just this group.
    pub fn command(&self) -> String {
        format!(
            "tasktrail edit --board=\"{}\" --column=COLUMN {}",
            self.board,
            self.task_ids.join(" ")
        )
    }
}

/// Group ambiguous tasks by the boards they share.
///
/// Tasks with an identical board-set always land together. Groups are built
/// greedily: the board found on the most remaining tasks (alphabetical on a
/// tie) becomes the hint, and every board-set containing it joins the group.
/// A task never appears in two groups. Failures other than ambiguity are
/// ignored.
pub fn suggest_partitions(failures: &[TaskFailure]) -> Vec<PartitionGroup> {
    let mut sets: Vec<(BTreeSet<String>, Vec<String>)> = Vec::new();
    for failure in failures {
        let ValidationError::Ambiguous { boards } = &failure.error else {
            continue;
        };
        let set: BTreeSet<String> = boards.iter().cloned().collect();
        match sets.iter_mut().find(|(existing, _)| *existing == set) {
            Some((_, tasks)) => tasks.push(failure.task_id.clone()),
            None => sets.push((set, vec![failure.task_id.clone()])),
        }
    }

    let mut groups = Vec::new();
    while !sets.is_empty() {
        let Some(board) = busiest_board(&sets) else {
            break;
        };

        let (taken, rest): (Vec<_>, Vec<_>) =
            sets.into_iter().partition(|(set, _)| set.contains(&board));
        sets = rest;

        let mut boards = BTreeSet::new();
        let mut task_ids = Vec::new();
        for (set, tasks) in taken {
            boards.extend(set);
            task_ids.extend(tasks);
        }
        groups.push(PartitionGroup {
            board,
            boards: boards.into_iter().collect(),
            task_ids,
        });
    }
    groups
}

/// Board found on the most tasks; ties go to the alphabetically first board.
fn busiest_board(sets: &[(BTreeSet<String>, Vec<String>)]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (set, tasks) in sets {
        for board in set {
            *counts.entry(board.as_str()).or_default() += tasks.len();
        }
    }
    counts
        .into_iter()
        .max_by(|(a_name, a), (b_name, b)| a.cmp(b).then(b_name.cmp(a_name)))
        .map(|(board, _)| board.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ambiguous(task_id: &str, boards: &[&str]) -> TaskFailure {
        TaskFailure::new(
            task_id,
            ValidationError::Ambiguous {
                boards: boards.iter().map(|b| b.to_string()).collect(),
            },
        )
    }

    #[test]
    fn shared_board_covers_overlapping_sets() {
        let groups = suggest_partitions(&[
            ambiguous("T1", &["BoardA", "BoardB"]),
            ambiguous("T2", &["BoardA", "BoardB"]),
            ambiguous("T3", &["BoardA", "BoardC"]),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].board, "BoardA");
        assert_eq!(groups[0].task_ids, vec!["T1", "T2", "T3"]);
        assert_eq!(groups[0].boards, vec!["BoardA", "BoardB", "BoardC"]);
    }

    #[test]
    fn disjoint_sets_get_their_own_groups() {
        let groups = suggest_partitions(&[
            ambiguous("T1", &["A", "B"]),
            ambiguous("T2", &["C", "D"]),
            ambiguous("T3", &["B", "A"]),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].board, "A");
        assert_eq!(groups[0].task_ids, vec!["T1", "T3"]);
        assert_eq!(groups[1].board, "C");
        assert_eq!(groups[1].task_ids, vec!["T2"]);
    }

    #[test]
    fn every_task_appears_once() {
        let groups = suggest_partitions(&[
            ambiguous("T1", &["A", "B"]),
            ambiguous("T2", &["B", "C"]),
            ambiguous("T3", &["C", "D"]),
            TaskFailure::new("T4", ValidationError::NotOnAnyBoard),
        ]);
        let mut seen: Vec<&str> = groups
            .iter()
            .flat_map(|group| group.task_ids.iter().map(String::as_str))
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["T1", "T2", "T3"]);
        for group in &groups {
            assert!(group.boards.contains(&group.board));
        }
    }

    #[test]
    fn command_lists_group_tasks() {
        let group = PartitionGroup {
            board: "Dev".to_string(),
            boards: vec!["Dev".to_string(), "QA".to_string()],
            task_ids: vec!["T1".to_string(), "T2".to_string()],
        };
        assert_eq!(
            group.command(),
            "tasktrail edit --board=\"Dev\" --column=COLUMN T1 T2"
        );
    }
}
