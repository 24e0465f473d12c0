//! Ordered level tables for priorities, statuses and board columns.
//!
//! Every ordered vocabulary (priority ladder, status ladder, a board's column
//! sequence) is a [`Ladder`]: levels listed lowest first, looked up
//! case-insensitively by name or alias. Directional navigation is a single
//! table-driven function, [`Ladder::step`], which owns both the skip policy
//! and the boundary policy.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Priority levels, lowest first.
pub const DEFAULT_PRIORITY_LEVELS: [&str; 6] =
    ["Wishlist", "Low", "Normal", "High", "Triage", "Unbreak Now!"];
/// Priority levels stepped over by raise/lower.
pub const DEFAULT_PRIORITY_SKIP: [&str; 1] = ["Triage"];
/// (alias, level) pairs accepted for priority input.
pub const DEFAULT_PRIORITY_ALIASES: [(&str, &str); 3] = [
    ("unbreak", "Unbreak Now!"),
    ("unbreak now", "Unbreak Now!"),
    ("wish", "Wishlist"),
];
/// Open statuses, in workflow order.
pub const DEFAULT_OPEN_STATUSES: [&str; 2] = ["Open", "Blocked"];
/// Closed statuses, in workflow order after the open ones.
pub const DEFAULT_CLOSED_STATUSES: [&str; 4] = ["Wontfix", "Invalid", "Duplicate", "Resolved"];

/// The kind of field a transition or pattern talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Column,
    Priority,
    Status,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Column => "column",
            Subject::Priority => "priority",
            Subject::Status => "status",
        }
    }

    /// Directions a transition of this subject can carry.
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Subject::Column => [Direction::Forward, Direction::Backward],
            Subject::Priority | Subject::Status => [Direction::Raised, Direction::Lowered],
        }
    }

    /// Map a rank comparison (`to` against `from`) onto this subject's directions.
    pub fn direction_for(self, ordering: Ordering) -> Option<Direction> {
        let [up, down] = self.directions();
        match ordering {
            Ordering::Greater => Some(up),
            Ordering::Less => Some(down),
            Ordering::Equal => None,
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Raised,
    Lowered,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "forward" => Some(Direction::Forward),
            "backward" => Some(Direction::Backward),
            "raised" => Some(Direction::Raised),
            "lowered" => Some(Direction::Lowered),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Raised => "raised",
            Direction::Lowered => "lowered",
        }
    }

    pub fn applies_to(self, subject: Subject) -> bool {
        subject.directions().contains(&self)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One navigation step along a ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// A named rung of a ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub closed: bool,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            closed: false,
        }
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn answers_to(&self, value: &str) -> bool {
        self.name.eq_ignore_ascii_case(value)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(value))
    }
}

/// A fixed total order over named levels, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ladder {
    levels: Vec<Level>,
    skip: Vec<usize>,
}

impl Ladder {
    /// Build a ladder. Skip names that do not resolve to a level are ignored;
    /// configuration validation reports them before a ladder is built.
    pub fn new(levels: Vec<Level>, skip: &[String]) -> Self {
        let mut ladder = Self {
            levels,
            skip: Vec::new(),
        };
        let skip = skip
            .iter()
            .filter_map(|name| ladder.position(name))
            .collect();
        ladder.skip = skip;
        ladder
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self::new(
            names.iter().map(|name| Level::new(name.as_ref())).collect(),
            &[],
        )
    }

    pub fn default_priority() -> Self {
        let levels = DEFAULT_PRIORITY_LEVELS
            .iter()
            .map(|name| {
                let mut level = Level::new(*name);
                for (alias, target) in DEFAULT_PRIORITY_ALIASES {
                    if target == *name {
                        level = level.with_alias(alias);
                    }
                }
                level
            })
            .collect();
        let skip: Vec<String> = DEFAULT_PRIORITY_SKIP.iter().map(|s| s.to_string()).collect();
        Self::new(levels, &skip)
    }

    pub fn default_status() -> Self {
        let levels = DEFAULT_OPEN_STATUSES
            .iter()
            .map(|name| Level::new(*name).with_alias(name.to_lowercase()))
            .chain(
                DEFAULT_CLOSED_STATUSES
                    .iter()
                    .map(|name| Level::new(*name).with_alias(name.to_lowercase()).closed()),
            )
            .collect();
        Self::new(levels, &[])
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.levels.get(index).map(|level| level.name.as_str())
    }

    /// Rank of a value, matching names and aliases case-insensitively.
    pub fn position(&self, value: &str) -> Option<usize> {
        let value = value.trim();
        self.levels.iter().position(|level| level.answers_to(value))
    }

    /// Canonical level name for a value, if it belongs to this ladder.
    pub fn canonical(&self, value: &str) -> Option<&str> {
        self.position(value).and_then(|index| self.name(index))
    }

    /// Compare the ranks of two values; `None` when either is unknown.
    pub fn compare(&self, from: &str, to: &str) -> Option<Ordering> {
        let from = self.position(from)?;
        let to = self.position(to)?;
        Some(to.cmp(&from))
    }

    pub fn is_skipped(&self, index: usize) -> bool {
        self.skip.contains(&index)
    }

    /// Whether a value is an open level. Display-only; never used for ranking.
    pub fn is_open(&self, value: &str) -> Option<bool> {
        self.position(value).map(|index| !self.levels[index].closed)
    }

    /// Canonical names in rank order, for error messages.
    pub fn choices(&self) -> Vec<String> {
        self.levels.iter().map(|level| level.name.clone()).collect()
    }

    /// Move one step from `current`.
    ///
    /// Skipped levels are stepped over unless `current` already is one, in which
    /// case the adjacent level is taken. Stepping past either end leaves the
    /// index unchanged.
    pub fn step(&self, current: usize, step: Step) -> usize {
        let len = self.levels.len();
        if current >= len {
            return current;
        }

        let neighbour = |index: usize| match step {
            Step::Up => index.checked_add(1).filter(|next| *next < len),
            Step::Down => index.checked_sub(1),
        };

        if self.is_skipped(current) {
            return neighbour(current).unwrap_or(current);
        }

        let mut candidate = current;
        while let Some(next) = neighbour(candidate) {
            if !self.is_skipped(next) {
                return next;
            }
            candidate = next;
        }
        current
    }

    /// Navigate by name; `None` when `current` is not on the ladder.
    pub fn navigate(&self, current: &str, step: Step) -> Option<&str> {
        let index = self.position(current)?;
        self.name(self.step(index, step))
    }
}

/// A board column as supplied by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub sequence: i64,
}

/// A board's columns ordered by `sequence`, re-indexed contiguously from 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSequence {
    ladder: Ladder,
}

impl ColumnSequence {
    pub fn from_specs(specs: &[ColumnSpec]) -> Self {
        let mut ordered: Vec<&ColumnSpec> = specs.iter().collect();
        ordered.sort_by_key(|spec| spec.sequence);
        let names: Vec<&str> = ordered.iter().map(|spec| spec.name.as_str()).collect();
        Self {
            ladder: Ladder::from_names(&names),
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            ladder: Ladder::from_names(names),
        }
    }

    pub fn len(&self) -> usize {
        self.ladder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ladder.is_empty()
    }

    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.ladder.position(column)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.ladder.name(index)
    }

    pub fn names(&self) -> Vec<String> {
        self.ladder.choices()
    }

    /// Direction of a move between two columns of this board.
    pub fn direction(&self, from: &str, to: &str) -> Option<Direction> {
        self.ladder
            .compare(from, to)
            .and_then(|ordering| Subject::Column.direction_for(ordering))
    }

    /// Neighbouring column in the given direction; unchanged at either end.
    pub fn step(&self, current: usize, step: Step) -> usize {
        self.ladder.step(current, step)
    }
}

/// Board name to column sequence, as resolved by the tracker.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    boards: BTreeMap<String, ColumnSequence>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, board: impl Into<String>, columns: ColumnSequence) {
        self.boards.insert(board.into(), columns);
    }

    pub fn with_board<S: AsRef<str>>(mut self, board: &str, columns: &[S]) -> Self {
        self.insert(board, ColumnSequence::from_names(columns));
        self
    }

    pub fn board(&self, name: &str) -> Option<&ColumnSequence> {
        self.boards.get(name)
    }

    /// Case-insensitive board lookup returning the canonical name.
    pub fn find_board(&self, name: &str) -> Option<(&str, &ColumnSequence)> {
        let name = name.trim();
        self.boards
            .get_key_value(name)
            .or_else(|| {
                self.boards
                    .iter()
                    .find(|(board, _)| board.eq_ignore_ascii_case(name))
            })
            .map(|(board, columns)| (board.as_str(), columns))
    }
}

/// The priority and status ladders active for one invocation.
#[derive(Debug, Clone)]
pub struct Ladders {
    pub priority: Ladder,
    pub status: Ladder,
}

impl Default for Ladders {
    fn default() -> Self {
        Self {
            priority: Ladder::default_priority(),
            status: Ladder::default_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priority() -> Ladder {
        Ladder::default_priority()
    }

    fn raise(from: &str) -> String {
        priority()
            .navigate(from, Step::Up)
            .expect("known priority")
            .to_string()
    }

    fn lower(from: &str) -> String {
        priority()
            .navigate(from, Step::Down)
            .expect("known priority")
            .to_string()
    }

    #[test]
    fn raise_walks_the_ladder_and_skips_triage() {
        assert_eq!(raise("Wishlist"), "Low");
        assert_eq!(raise("Low"), "Normal");
        assert_eq!(raise("Normal"), "High");
        assert_eq!(raise("High"), "Unbreak Now!");
    }

    #[test]
    fn lower_walks_the_ladder_and_skips_triage() {
        assert_eq!(lower("Unbreak Now!"), "High");
        assert_eq!(lower("High"), "Normal");
        assert_eq!(lower("Normal"), "Low");
        assert_eq!(lower("Low"), "Wishlist");
    }

    #[test]
    fn triage_takes_a_single_adjacent_step() {
        assert_eq!(raise("Triage"), "Unbreak Now!");
        assert_eq!(lower("Triage"), "High");
    }

    #[test]
    fn boundaries_are_no_ops() {
        assert_eq!(raise("Unbreak Now!"), "Unbreak Now!");
        assert_eq!(lower("Wishlist"), "Wishlist");
    }

    #[test]
    fn skip_at_the_top_leaves_value_unchanged() {
        let ladder = Ladder::new(
            vec![Level::new("Low"), Level::new("High"), Level::new("Triage")],
            &["Triage".to_string()],
        );
        assert_eq!(ladder.navigate("High", Step::Up), Some("High"));
        assert_eq!(ladder.navigate("Triage", Step::Up), Some("Triage"));
        assert_eq!(ladder.navigate("Triage", Step::Down), Some("High"));
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let ladder = priority();
        assert_eq!(ladder.canonical("unbreak"), Some("Unbreak Now!"));
        assert_eq!(ladder.canonical("UNBREAK NOW"), Some("Unbreak Now!"));
        assert_eq!(ladder.canonical("wish"), Some("Wishlist"));
        assert_eq!(ladder.canonical("normal"), Some("Normal"));
        assert_eq!(ladder.canonical("urgent"), None);
    }

    #[test]
    fn compare_reports_rank_direction() {
        let ladder = priority();
        assert_eq!(ladder.compare("Normal", "High"), Some(Ordering::Greater));
        assert_eq!(ladder.compare("High", "Triage"), Some(Ordering::Greater));
        assert_eq!(ladder.compare("High", "Low"), Some(Ordering::Less));
        assert_eq!(ladder.compare("High", "high"), Some(Ordering::Equal));
        assert_eq!(ladder.compare("High", "Someday"), None);
    }

    #[test]
    fn status_open_subset_is_display_only() {
        let ladder = Ladder::default_status();
        assert_eq!(ladder.is_open("Open"), Some(true));
        assert_eq!(ladder.is_open("resolved"), Some(false));
        assert_eq!(ladder.compare("Open", "Resolved"), Some(Ordering::Greater));
    }

    #[test]
    fn column_sequence_orders_by_sequence_field() {
        let columns = ColumnSequence::from_specs(&[
            ColumnSpec {
                name: "Done".to_string(),
                sequence: 30,
            },
            ColumnSpec {
                name: "Backlog".to_string(),
                sequence: 5,
            },
            ColumnSpec {
                name: "In Progress".to_string(),
                sequence: 10,
            },
        ]);
        assert_eq!(columns.index_of("Backlog"), Some(0));
        assert_eq!(columns.index_of("in progress"), Some(1));
        assert_eq!(columns.index_of("Done"), Some(2));
        assert_eq!(
            columns.direction("Done", "Backlog"),
            Some(Direction::Backward)
        );
        assert_eq!(columns.direction("Backlog", "Done"), Some(Direction::Forward));
        assert_eq!(columns.direction("Done", "Done"), None);
        assert_eq!(columns.direction("Done", "Archived"), None);
    }

    #[test]
    fn column_step_stops_at_both_ends() {
        let columns = ColumnSequence::from_names(&["Backlog", "Doing", "Done"]);
        assert_eq!(columns.step(0, Step::Up), 1);
        assert_eq!(columns.step(2, Step::Up), 2);
        assert_eq!(columns.step(1, Step::Down), 0);
        assert_eq!(columns.step(0, Step::Down), 0);
    }

    #[test]
    fn topology_finds_boards_case_insensitively() {
        let topology = Topology::new().with_board("Dev", &["Todo", "Done"]);
        let (name, columns) = topology.find_board("dev").expect("board");
        assert_eq!(name, "Dev");
        assert_eq!(columns.len(), 2);
        assert!(topology.find_board("QA").is_none());
    }
}
