//! tasktrail - Transition-History Filtering Library
//!
//! This library provides the core functionality for the tasktrail CLI:
//! deciding whether a task's history matches a transition pattern, and
//! validating batch edits all-or-nothing.
//!
//! # Core Concepts
//!
//! - **History**: a task's raw transaction feed, normalized into ordered
//!   column (per board), priority and status transitions
//! - **Ladders**: ordered priority/status levels and board column sequences,
//!   with raise/lower skip rules and no-op boundaries
//! - **Patterns**: `from:Doing:backward+not:in:QA,to:Done` style filters
//! - **Batches**: edits validated for every task before any is approved,
//!   with partition suggestions for multi-board ambiguity
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.tasktrail.toml`
//! - `error`: Error types and result aliases
//! - `task`: Task records and transaction events
//! - `snapshot`: Tracker snapshot input
//! - `ladder`: Priority/status ladders and column sequences
//! - `history`: Feed normalization
//! - `pattern`: Pattern parser and AST
//! - `evaluate`: Predicate evaluation
//! - `filter`: Task selection and parallel search
//! - `tags`: Board membership patterns
//! - `resolve`: Board/column resolution
//! - `batch`: Batch edit validation
//! - `partition`: Partition suggestions
//! - `events`: JSONL change-set output
//! - `output`: Shared CLI output formatting

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod events;
pub mod filter;
pub mod history;
pub mod ladder;
pub mod output;
pub mod partition;
pub mod pattern;
pub mod resolve;
pub mod snapshot;
pub mod tags;
pub mod task;

pub use error::{Error, Result};
