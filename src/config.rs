//! Configuration loading and validation.
//!
//! The config document carries the account settings and an array of
//! matchers. Validation is a pure transform: the raw TOML document goes
//! in, an immutable [`Config`] comes out, and the input is never
//! mutated. Checks run fail-fast in matcher array order, required keys
//! before threshold parsing, and every error names the exact dotted
//! path of the offending option.

use std::path::{Path, PathBuf};
use std::{fs, io};

use jiff::{Timestamp, Zoned};
use toml::Value;
use toml::value::Table;

use crate::deadline::{BusinessCalendar, ResponseTime};
use crate::model::{DEFAULT_OVERDUE_LABEL, DEFAULT_WARN_LABEL, Matcher, Target};

/// Errors detected while loading or validating the config document.
///
/// All of these are fatal and reported before any network I/O happens.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Unreadable { path: PathBuf, source: io::Error },

    #[error("invalid TOML: {0}")]
    Syntax(#[from] toml::de::Error),

    #[error("configuration option required: {path}")]
    KeyNotFound { path: String },

    #[error("configuration option {path} is a {actual}, but it should be a {expected}")]
    KeyTypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("configuration option {path} must have either a group_id or a user_id, not both")]
    KeyConflict { path: String },

    #[error(
        "configuration option {path} is not a recognized duration: {value:?} \
         (expected something like \"3 business days\" or \"5 days\")"
    )]
    UnparsableDuration { path: String, value: String },
}

/// The validated configuration: account settings plus the rule set.
///
/// Built once at startup and immutable afterwards; every component
/// receives it by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth_token: String,
    pub company: String,
    pub dry_run: bool,
    pub matchers: Vec<Matcher>,
}

impl Config {
    /// Load and validate a config file.
    ///
    /// `now` anchors threshold resolution: all matchers in the returned
    /// config are resolved against this one instant.
    pub fn load(
        path: &Path,
        now: &Zoned,
        calendar: &dyn BusinessCalendar,
    ) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, now, calendar)
    }

    /// Validate a config document already in memory.
    pub fn parse(
        document: &str,
        now: &Zoned,
        calendar: &dyn BusinessCalendar,
    ) -> Result<Self, ConfigError> {
        let root: Table = toml::from_str(document)?;

        let auth_token = require_str(&root, "auth_token", "auth_token")?.to_string();
        let company = require_str(&root, "company", "company")?.to_string();
        let dry_run = match root.get("dry_run") {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| type_mismatch("dry_run", "boolean", value))?,
            None => false,
        };

        let matchers_value = require(&root, "matchers", "matchers")?;
        let entries = matchers_value
            .as_array()
            .ok_or_else(|| type_mismatch("matchers", "array", matchers_value))?;

        let mut matchers = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            matchers.push(build_matcher(entry, index, now, calendar)?);
        }

        Ok(Self {
            auth_token,
            company,
            dry_run,
            matchers,
        })
    }
}

/// Validate one matcher entry into a [`Matcher`].
fn build_matcher(
    entry: &Value,
    index: usize,
    now: &Zoned,
    calendar: &dyn BusinessCalendar,
) -> Result<Matcher, ConfigError> {
    let path = format!("matchers[{index}]");
    let table = entry
        .as_table()
        .ok_or_else(|| type_mismatch(&path, "table", entry))?;

    let name = require_str(table, "name", &format!("{path}.name"))?.to_string();
    let conditions_path = format!("{path}.conditions");
    let conditions = require_table(table, "conditions", &conditions_path)?;
    let enforce_path = format!("{path}.enforce");
    let enforce = require_table(table, "enforce", &enforce_path)?;

    let target = target_from(conditions, &conditions_path)?;

    // Required keys are checked before any duration parsing so the first
    // reported error is deterministic.
    let overdue_path = format!("{enforce_path}.overdue_time");
    let overdue_text = require_str(enforce, "overdue_time", &overdue_path)?;

    let has_label = label_list(conditions, "has_label", &conditions_path)?;
    let has_no_label = label_list(conditions, "has_no_label", &conditions_path)?;

    let overdue_threshold = resolve(overdue_text, &overdue_path, now, calendar)?;
    let warn_threshold = match enforce.get("warn_time") {
        Some(value) => {
            let warn_path = format!("{enforce_path}.warn_time");
            let text = value
                .as_str()
                .ok_or_else(|| type_mismatch(&warn_path, "string", value))?;
            Some(resolve(text, &warn_path, now, calendar)?)
        }
        None => None,
    };

    let warn_label = optional_str(enforce, "warn_label", &enforce_path)?
        .unwrap_or(DEFAULT_WARN_LABEL)
        .to_string();
    let overdue_label = optional_str(enforce, "overdue_label", &enforce_path)?
        .unwrap_or(DEFAULT_OVERDUE_LABEL)
        .to_string();

    Ok(Matcher {
        name,
        target,
        has_label,
        has_no_label,
        warn_threshold,
        overdue_threshold,
        warn_label,
        overdue_label,
    })
}

/// Resolve the target entity from `group_id`/`user_id`.
///
/// Exactly one must be present; the sum type makes the invalid states
/// unrepresentable past this point.
fn target_from(conditions: &Table, path: &str) -> Result<Target, ConfigError> {
    match (conditions.get("group_id"), conditions.get("user_id")) {
        (Some(_), Some(_)) => Err(ConfigError::KeyConflict {
            path: path.to_string(),
        }),
        (Some(value), None) => Ok(Target::Group(id_from(value, &format!("{path}.group_id"))?)),
        (None, Some(value)) => Ok(Target::User(id_from(value, &format!("{path}.user_id"))?)),
        (None, None) => Err(ConfigError::KeyNotFound {
            path: path.to_string(),
        }),
    }
}

fn id_from(value: &Value, path: &str) -> Result<u64, ConfigError> {
    let id = value
        .as_integer()
        .ok_or_else(|| type_mismatch(path, "integer", value))?;
    u64::try_from(id).map_err(|_| type_mismatch(path, "non-negative integer", value))
}

/// Normalize a label condition: absent means empty, a single string is
/// promoted to a one-element list.
fn label_list(conditions: &Table, key: &str, parent: &str) -> Result<Vec<String>, ConfigError> {
    let Some(value) = conditions.get(key) else {
        return Ok(Vec::new());
    };
    let path = format!("{parent}.{key}");
    match value {
        Value::String(label) => Ok(vec![label.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.as_str() {
                Some(label) => Ok(label.to_string()),
                None => Err(type_mismatch(&path, "string or array of strings", item)),
            })
            .collect(),
        _ => Err(type_mismatch(&path, "string or array of strings", value)),
    }
}

fn resolve(
    text: &str,
    path: &str,
    now: &Zoned,
    calendar: &dyn BusinessCalendar,
) -> Result<Timestamp, ConfigError> {
    let time = ResponseTime::parse(text).ok_or_else(|| ConfigError::UnparsableDuration {
        path: path.to_string(),
        value: text.to_string(),
    })?;
    Ok(time.cutoff(now, calendar))
}

fn require<'a>(table: &'a Table, key: &str, path: &str) -> Result<&'a Value, ConfigError> {
    table.get(key).ok_or_else(|| ConfigError::KeyNotFound {
        path: path.to_string(),
    })
}

fn require_str<'a>(table: &'a Table, key: &str, path: &str) -> Result<&'a str, ConfigError> {
    let value = require(table, key, path)?;
    value
        .as_str()
        .ok_or_else(|| type_mismatch(path, "string", value))
}

fn require_table<'a>(table: &'a Table, key: &str, path: &str) -> Result<&'a Table, ConfigError> {
    let value = require(table, key, path)?;
    value
        .as_table()
        .ok_or_else(|| type_mismatch(path, "table", value))
}

fn optional_str<'a>(
    table: &'a Table,
    key: &str,
    parent: &str,
) -> Result<Option<&'a str>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(value) => match value.as_str() {
            Some(text) => Ok(Some(text)),
            None => Err(type_mismatch(
                &format!("{parent}.{key}"),
                "string",
                value,
            )),
        },
    }
}

fn type_mismatch(path: &str, expected: &'static str, value: &Value) -> ConfigError {
    ConfigError::KeyTypeMismatch {
        path: path.to_string(),
        expected,
        actual: value.type_str(),
    }
}
