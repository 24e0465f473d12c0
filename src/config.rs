//! Configuration loading and management
//!
//! Handles parsing of `.tasktrail.toml` configuration files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ladder::{
    Ladder, Ladders, Level, DEFAULT_CLOSED_STATUSES, DEFAULT_OPEN_STATUSES,
    DEFAULT_PRIORITY_ALIASES, DEFAULT_PRIORITY_LEVELS, DEFAULT_PRIORITY_SKIP,
};

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = ".tasktrail.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Priority ladder
    #[serde(default)]
    pub priority: PriorityConfig,

    /// Status ladder
    #[serde(default)]
    pub status: StatusConfig,

    /// Search tuning
    #[serde(default)]
    pub search: SearchConfig,
}

/// Priority-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Levels, lowest first
    #[serde(default = "default_priority_levels")]
    pub levels: Vec<String>,

    /// Levels stepped over by raise/lower. When unset, the built-in skip
    /// levels that appear in `levels`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Vec<String>>,

    /// Alternative spellings (alias -> level), added to the built-in
    /// aliases of whichever built-in levels `levels` keeps
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_priority_levels() -> Vec<String> {
    DEFAULT_PRIORITY_LEVELS.iter().map(|s| s.to_string()).collect()
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            levels: default_priority_levels(),
            skip: None,
            aliases: BTreeMap::new(),
        }
    }
}

/// Status-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Open statuses, in workflow order
    #[serde(default = "default_open_statuses")]
    pub open: Vec<String>,

    /// Closed statuses, ranked after the open ones
    #[serde(default = "default_closed_statuses")]
    pub closed: Vec<String>,

    /// Alternative spellings (alias -> status)
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

fn default_open_statuses() -> Vec<String> {
    DEFAULT_OPEN_STATUSES.iter().map(|s| s.to_string()).collect()
}

fn default_closed_statuses() -> Vec<String> {
    DEFAULT_CLOSED_STATUSES.iter().map(|s| s.to_string()).collect()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            open: default_open_statuses(),
            closed: default_closed_statuses(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Worker threads used to normalize task histories
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    4
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl Config {
    /// Load configuration from a `.tasktrail.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.tasktrail.toml` from `dir`, or return defaults when absent
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicit `--config` file, falling back to the working directory
    pub fn resolve(explicit: Option<&PathBuf>) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(Error::InvalidConfig(format!(
                "config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load(path),
            None => Self::load_from_dir(&std::env::current_dir()?),
        }
    }

    /// Ladders described by this configuration
    pub fn ladders(&self) -> Ladders {
        Ladders {
            priority: self.priority.ladder(),
            status: self.status.ladder(),
        }
    }

    fn validate(&self) -> Result<()> {
        self.priority.validate()?;
        self.status.validate()?;
        self.search.validate()?;
        Ok(())
    }
}

impl PriorityConfig {
    pub fn ladder(&self) -> Ladder {
        Ladder::new(
            with_aliases(&self.levels, &self.effective_aliases(), false),
            &self.skip_levels(),
        )
    }

    /// Skip levels in effect.
    pub fn skip_levels(&self) -> Vec<String> {
        match &self.skip {
            Some(skip) => skip.clone(),
            None => DEFAULT_PRIORITY_SKIP
                .iter()
                .filter(|name| contains(&self.levels, name))
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Built-in aliases whose level is configured, then the configured ones.
    pub fn effective_aliases(&self) -> BTreeMap<String, String> {
        let mut aliases: BTreeMap<String, String> = DEFAULT_PRIORITY_ALIASES
            .iter()
            .filter(|(alias, level)| contains(&self.levels, level) && !contains(&self.levels, alias))
            .map(|(alias, level)| (alias.to_string(), level.to_string()))
            .collect();
        aliases.extend(
            self.aliases
                .iter()
                .map(|(alias, level)| (alias.clone(), level.clone())),
        );
        aliases
    }

    fn validate(&self) -> Result<()> {
        validate_levels(&self.levels, "priority.levels")?;
        for name in self.skip.iter().flatten() {
            if !contains(&self.levels, name) {
                return Err(Error::InvalidConfig(format!(
                    "priority.skip: '{name}' is not a priority level"
                )));
            }
        }
        validate_aliases(&self.aliases, &self.levels, "priority.aliases")
    }
}

impl StatusConfig {
    pub fn ladder(&self) -> Ladder {
        let mut levels = with_aliases(&self.open, &self.aliases, false);
        levels.extend(with_aliases(&self.closed, &self.aliases, true));
        Ladder::new(levels, &[])
    }

    fn validate(&self) -> Result<()> {
        let all: Vec<String> = self.open.iter().chain(&self.closed).cloned().collect();
        if self.open.is_empty() {
            return Err(Error::InvalidConfig(
                "status.open must include at least one status".to_string(),
            ));
        }
        validate_levels(&all, "status")?;
        validate_aliases(&self.aliases, &all, "status.aliases")
    }
}

impl SearchConfig {
    fn validate(&self) -> Result<()> {
        if !(1..=64).contains(&self.workers) {
            return Err(Error::InvalidConfig(
                "search.workers must be between 1 and 64".to_string(),
            ));
        }
        Ok(())
    }
}

fn with_aliases(names: &[String], aliases: &BTreeMap<String, String>, closed: bool) -> Vec<Level> {
    names
        .iter()
        .map(|name| {
            let mut level = Level::new(name.as_str());
            level.closed = closed;
            for (alias, target) in aliases {
                if target.eq_ignore_ascii_case(name) {
                    level = level.with_alias(alias.as_str());
                }
            }
            level
        })
        .collect()
}

fn contains(levels: &[String], name: &str) -> bool {
    levels.iter().any(|level| level.eq_ignore_ascii_case(name))
}

fn validate_levels(levels: &[String], field: &str) -> Result<()> {
    if levels.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    for (index, level) in levels.iter().enumerate() {
        if level.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "{field}: level names cannot be empty"
            )));
        }
        if contains(&levels[..index], level) {
            return Err(Error::InvalidConfig(format!(
                "{field}: duplicate level '{level}'"
            )));
        }
    }
    Ok(())
}

fn validate_aliases(
    aliases: &BTreeMap<String, String>,
    levels: &[String],
    field: &str,
) -> Result<()> {
    for (alias, target) in aliases {
        if !contains(levels, target) {
            return Err(Error::InvalidConfig(format!(
                "{field}: alias '{alias}' points to unknown level '{target}'"
            )));
        }
        if contains(levels, alias) && !alias.eq_ignore_ascii_case(target) {
            return Err(Error::InvalidConfig(format!(
                "{field}: alias '{alias}' shadows a level name"
            )));
        }
    }
    Ok(())
}
