//! Board-membership patterns (`--tag`).
//!
//! `,` separates alternatives and `+` requires several boards at once, so
//! `Dev+QA,Ops*` selects tasks on both Dev and QA, or on any board starting
//! with `Ops`. Names match case-insensitively with `*`/`?` wildcards.

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
pub struct TagPattern {
    source: String,
    terms: Vec<Vec<Pattern>>,
}

impl TagPattern {
    pub fn parse(input: &str) -> Result<Self> {
        let mut terms = Vec::new();
        for term in input.split(',') {
            let globs = term
                .split('+')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    Pattern::new(name).map_err(|err| {
                        Error::InvalidArgument(format!("invalid tag pattern '{name}': {err}"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            if !globs.is_empty() {
                terms.push(globs);
            }
        }

        if terms.is_empty() {
            return Err(Error::InvalidArgument(
                "tag pattern cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            source: input.trim().to_string(),
            terms,
        })
    }

    /// Whether a task attached to `boards` satisfies the pattern.
    pub fn matches_boards(&self, boards: &[&str]) -> bool {
        self.terms.iter().any(|term| {
            term.iter().all(|glob| {
                boards
                    .iter()
                    .any(|board| glob.matches_with(board, MATCH_OPTIONS))
            })
        })
    }

    /// Whether any glob of the pattern names this board.
    pub fn names_board(&self, board: &str) -> bool {
        self.terms
            .iter()
            .flatten()
            .any(|glob| glob.matches_with(board, MATCH_OPTIONS))
    }
}

impl std::fmt::Display for TagPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_is_or_and_plus_is_and() {
        let pattern = TagPattern::parse("Dev+QA,Ops").expect("pattern");
        assert!(pattern.matches_boards(&["Dev", "QA"]));
        assert!(pattern.matches_boards(&["Ops"]));
        assert!(!pattern.matches_boards(&["Dev"]));
        assert!(!pattern.matches_boards(&[]));
    }

    #[test]
    fn wildcards_match_case_insensitively() {
        let pattern = TagPattern::parse("web*").expect("pattern");
        assert!(pattern.matches_boards(&["Web Frontend"]));
        assert!(pattern.names_board("WEBSITE"));
        assert!(!pattern.names_board("Backend"));
    }

    #[test]
    fn rejects_empty_and_invalid_patterns() {
        assert!(TagPattern::parse(" , + ").is_err());
        assert!(TagPattern::parse("[unclosed").is_err());
    }
}
