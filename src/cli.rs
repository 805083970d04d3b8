//! CLI surface: a single optional path to the config document.

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Enforce SLA rules on helpdesk tickets.
///
/// Classifies unanswered tickets against the configured matchers and
/// applies warning/overdue labels when response-time thresholds are
/// breached.
#[derive(Debug, Parser)]
#[command(name = "sla-enforcer")]
pub struct Cli {
    /// Path to the config file.
    /// Defaults to `config.toml` next to the executable.
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolve the config path: the explicit argument, or the default
    /// colocated with the executable.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

fn default_config_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map_or_else(|| PathBuf::from("config.toml"), |dir| dir.join("config.toml"))
}
