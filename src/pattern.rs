//! Transition pattern language parser and AST.
//!
//! Parses expressions like:
//! - in:Done
//! - from:In Progress:backward+not:in:Blocked
//! - to:Done,never:QA
//! - raised
//!
//! `,` separates OR terms, `+` separates the AND literals of a term, and each
//! literal may be prefixed with `not:`. A backslash escapes the next
//! character, so values can carry `,` `+` or `:` literally.

use crate::ladder::{Direction, Subject};

/// OR of AND-terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub terms: Vec<Conjunction>,
}

/// AND of literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conjunction {
    pub literals: Vec<Literal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub negated: bool,
    pub predicate: Predicate,
}

impl Literal {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            negated: false,
            predicate,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    From {
        value: String,
        direction: Option<Direction>,
    },
    To(String),
    In(String),
    Been(String),
    Never(String),
    /// Bare direction keyword: any transition moved this way.
    Moved(Direction),
}

const VALUE_KEYWORDS: [&str; 5] = ["from", "to", "in", "been", "never"];
const NEGATION: &str = "not";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Parse a pattern without restricting which direction keywords it may use.
pub fn parse_pattern(input: &str) -> Result<Pattern, ParseError> {
    Parser::new(input, None).parse()
}

/// Parse a pattern for one subject; direction keywords of other subjects are
/// rejected (`forward` in a priority pattern, `raised` in a column pattern).
pub fn parse_pattern_for(subject: Subject, input: &str) -> Result<Pattern, ParseError> {
    Parser::new(input, Some(subject)).parse()
}

/// A `:`-separated piece of a literal, unescaped and trimmed.
#[derive(Debug, Clone)]
struct Part {
    text: String,
    pos: usize,
}

/// Raw split of the input: OR terms of AND literals of parts.
type RawTerms = Vec<Vec<Vec<Part>>>;

struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input }
    }

    fn split(&self) -> Result<RawTerms, ParseError> {
        let mut terms: RawTerms = Vec::new();
        let mut literals: Vec<Vec<Part>> = Vec::new();
        let mut parts: Vec<Part> = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        let mut chars = self.input.char_indices();
        while let Some((pos, ch)) = chars.next() {
            match ch {
                '\\' => match chars.next() {
                    Some((_, escaped)) => current.push(escaped),
                    None => return Err(ParseError::new("Dangling escape", pos)),
                },
                ':' => {
                    parts.push(finish_part(&mut current, start));
                    start = pos + 1;
                }
                '+' => {
                    parts.push(finish_part(&mut current, start));
                    literals.push(std::mem::take(&mut parts));
                    start = pos + 1;
                }
                ',' => {
                    parts.push(finish_part(&mut current, start));
                    literals.push(std::mem::take(&mut parts));
                    terms.push(std::mem::take(&mut literals));
                    start = pos + 1;
                }
                _ => current.push(ch),
            }
        }
        parts.push(finish_part(&mut current, start));
        literals.push(parts);
        terms.push(literals);
        Ok(terms)
    }
}

fn finish_part(current: &mut String, start: usize) -> Part {
    let raw = std::mem::take(current);
    let leading = raw.len() - raw.trim_start().len();
    Part {
        text: raw.trim().to_string(),
        pos: start + leading,
    }
}

fn is_blank(parts: &[Part]) -> bool {
    parts.len() == 1 && parts[0].text.is_empty()
}

struct Parser<'a> {
    input: &'a str,
    subject: Option<Subject>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, subject: Option<Subject>) -> Self {
        Self { input, subject }
    }

    fn parse(&self) -> Result<Pattern, ParseError> {
        if self.input.trim().is_empty() {
            return Err(ParseError::new("Empty pattern", 0));
        }

        let mut terms = Vec::new();
        for raw_term in Lexer::new(self.input).split()? {
            let mut literals = Vec::new();
            for parts in raw_term {
                // Stray separators ("a,,b", "a++b") are tolerated.
                if is_blank(&parts) {
                    continue;
                }
                literals.push(self.parse_literal(parts)?);
            }
            if !literals.is_empty() {
                terms.push(Conjunction { literals });
            }
        }

        if terms.is_empty() {
            return Err(ParseError::new("No valid patterns found", 0));
        }
        Ok(Pattern { terms })
    }

    fn parse_literal(&self, parts: Vec<Part>) -> Result<Literal, ParseError> {
        let mut negated = false;
        let mut rest = parts.as_slice();
        while rest.len() > 1 && rest[0].text == NEGATION {
            negated = !negated;
            rest = &rest[1..];
        }

        let keyword = &rest[0];
        let predicate = match Direction::parse(&keyword.text) {
            Some(direction) => {
                if let Some(extra) = rest.get(1) {
                    return Err(ParseError::new(
                        format!("'{}' takes no value", keyword.text),
                        extra.pos,
                    ));
                }
                self.check_direction(direction, keyword.pos)?;
                Predicate::Moved(direction)
            }
            None => self.parse_keyword(rest)?,
        };

        Ok(Literal { negated, predicate })
    }

    fn parse_keyword(&self, parts: &[Part]) -> Result<Predicate, ParseError> {
        let keyword = &parts[0];
        if !VALUE_KEYWORDS.contains(&keyword.text.as_str()) {
            let message = if keyword.text.is_empty() {
                "Expected pattern keyword".to_string()
            } else {
                format!(
                    "Unknown pattern type '{}'. Valid types: {}, forward, backward, raised, lowered",
                    keyword.text,
                    VALUE_KEYWORDS.join(", ")
                )
            };
            return Err(ParseError::new(message, keyword.pos));
        }

        let value = match parts.get(1) {
            Some(part) if !part.text.is_empty() => part.text.clone(),
            Some(part) => {
                return Err(ParseError::new(
                    format!("Missing value after '{}:'", keyword.text),
                    part.pos,
                ))
            }
            None => {
                return Err(ParseError::new(
                    format!("Missing value after '{}'", keyword.text),
                    keyword.pos + keyword.text.len(),
                ))
            }
        };

        let direction = match parts.get(2) {
            None => None,
            Some(part) if keyword.text != "from" => {
                return Err(ParseError::new(
                    format!("Direction modifier only allowed for 'from' patterns, got '{}'", part.text),
                    part.pos,
                ));
            }
            Some(part) => {
                let direction = Direction::parse(&part.text).ok_or_else(|| {
                    ParseError::new(format!("Invalid direction '{}'", part.text), part.pos)
                })?;
                self.check_direction(direction, part.pos)?;
                Some(direction)
            }
        };

        if let Some(extra) = parts.get(3) {
            return Err(ParseError::new("Unexpected ':' after direction", extra.pos));
        }

        Ok(match keyword.text.as_str() {
            "from" => Predicate::From { value, direction },
            "to" => Predicate::To(value),
            "in" => Predicate::In(value),
            "been" => Predicate::Been(value),
            _ => Predicate::Never(value),
        })
    }

    fn check_direction(&self, direction: Direction, pos: usize) -> Result<(), ParseError> {
        match self.subject {
            Some(subject) if !direction.applies_to(subject) => {
                let [first, second] = subject.directions();
                Err(ParseError::new(
                    format!(
                        "Direction '{direction}' does not apply to {subject} patterns (expected {first} or {second})"
                    ),
                    pos,
                ))
            }
            _ => Ok(()),
        }
    }
}

fn write_value(f: &mut std::fmt::Formatter<'_>, value: &str) -> std::fmt::Result {
    for ch in value.chars() {
        if matches!(ch, ',' | '+' | ':' | '\\') {
            write!(f, "\\")?;
        }
        write!(f, "{ch}")?;
    }
    Ok(())
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (keyword, value) = match self {
            Predicate::Moved(direction) => return write!(f, "{direction}"),
            Predicate::From { value, direction } => {
                write!(f, "from:")?;
                write_value(f, value)?;
                if let Some(direction) = direction {
                    write!(f, ":{direction}")?;
                }
                return Ok(());
            }
            Predicate::To(value) => ("to", value),
            Predicate::In(value) => ("in", value),
            Predicate::Been(value) => ("been", value),
            Predicate::Never(value) => ("never", value),
        };
        write!(f, "{keyword}:")?;
        write_value(f, value)
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "{NEGATION}:")?;
        }
        write!(f, "{}", self.predicate)
    }
}

impl std::fmt::Display for Conjunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, "+")?;
            }
            write!(f, "{literal}")?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
