//! Evaluation of parsed patterns against one transition sequence.

use crate::history::{BoardHistory, TaskHistory, TransitionRecord};
use crate::ladder::{Ladder, Ladders, Subject};
use crate::pattern::{Conjunction, Literal, Pattern, Predicate};

/// One subject's ordered transitions together with its live value.
#[derive(Debug, Clone, Copy)]
pub struct Track<'a> {
    pub subject: Subject,
    pub records: &'a [TransitionRecord],
    pub live: Option<&'a str>,
    ladder: Option<&'a Ladder>,
}

impl<'a> Track<'a> {
    pub fn new(subject: Subject, records: &'a [TransitionRecord], live: Option<&'a str>) -> Self {
        Self {
            subject,
            records,
            live,
            ladder: None,
        }
    }

    /// Compare values through a ladder so aliases (`unbreak`) match canonical names.
    pub fn with_ladder(mut self, ladder: &'a Ladder) -> Self {
        self.ladder = Some(ladder);
        self
    }

    pub fn column(board: &'a BoardHistory) -> Self {
        Self::new(Subject::Column, &board.transitions, board.live.as_deref())
    }

    pub fn priority(history: &'a TaskHistory, ladders: &'a Ladders) -> Self {
        Self::new(
            Subject::Priority,
            &history.priority,
            Some(history.live_priority.as_str()),
        )
        .with_ladder(&ladders.priority)
    }

    pub fn status(history: &'a TaskHistory, ladders: &'a Ladders) -> Self {
        Self::new(
            Subject::Status,
            &history.status,
            Some(history.live_status.as_str()),
        )
        .with_ladder(&ladders.status)
    }

    /// Column names compare exactly; priority and status names compare by
    /// level when both resolve, case-insensitively otherwise.
    fn same(&self, left: &str, right: &str) -> bool {
        let (left, right) = (left.trim(), right.trim());
        match self.subject {
            Subject::Column => left == right,
            Subject::Priority | Subject::Status => {
                if let Some(ladder) = self.ladder {
                    if let (Some(a), Some(b)) = (ladder.position(left), ladder.position(right)) {
                        return a == b;
                    }
                }
                left.eq_ignore_ascii_case(right)
            }
        }
    }
}

pub fn evaluate_pattern(pattern: &Pattern, track: &Track<'_>) -> bool {
    pattern
        .terms
        .iter()
        .any(|term| evaluate_conjunction(term, track))
}

pub fn evaluate_conjunction(term: &Conjunction, track: &Track<'_>) -> bool {
    term.literals
        .iter()
        .all(|literal| evaluate_literal(literal, track))
}

pub fn evaluate_literal(literal: &Literal, track: &Track<'_>) -> bool {
    evaluate(&literal.predicate, track) != literal.negated
}

/// Evaluate one atomic predicate. Never touches the history it reads.
pub fn evaluate(predicate: &Predicate, track: &Track<'_>) -> bool {
    match predicate {
        Predicate::In(value) => track.live.is_some_and(|live| track.same(live, value)),
        Predicate::Been(value) => has_been(track, value),
        Predicate::Never(value) => !has_been(track, value),
        Predicate::From { value, direction } => track.records.iter().any(|record| {
            record
                .from
                .as_deref()
                .is_some_and(|from| track.same(from, value))
                && direction.map_or(true, |wanted| record.direction == Some(wanted))
        }),
        Predicate::To(value) => track
            .records
            .iter()
            .any(|record| track.same(&record.to, value)),
        Predicate::Moved(direction) => track
            .records
            .iter()
            .any(|record| record.direction == Some(*direction)),
    }
}

/// The value was occupied at some point: either end of any transition, or
/// the live value when nothing was ever recorded.
fn has_been(track: &Track<'_>, value: &str) -> bool {
    if track.records.is_empty() {
        return track.live.is_some_and(|live| track.same(live, value));
    }
    track.records.iter().any(|record| {
        track.same(&record.to, value)
            || record
                .from
                .as_deref()
                .is_some_and(|from| track.same(from, value))
    })
}
