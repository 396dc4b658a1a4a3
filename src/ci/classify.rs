use std::path::Path;

use log::info;
use serde::Deserialize;

use super::types::{Job, Run};
use crate::error::{PrKitError, Result};

/// Outcome of classifying a failed run's console logs.
///
/// `Undetermined` is a first-class "no known signature matched" value, kept
/// distinct from the explicit `NoRestart` decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Human action required; restarting will not help
    NoRestart,
    /// Re-execute the entire matrix
    FullRestart,
    /// Re-execute only the failed jobs
    PartialRestart,
    /// No pattern matched any job console
    Undetermined,
}

impl RestartDecision {
    pub fn needs_restart(self) -> bool {
        matches!(self, Self::FullRestart | Self::PartialRestart)
    }

    /// Legacy boolean-pair view of the decision. `None` means no
    /// determination was made, not "false".
    pub fn rerun_failed_only(self) -> Option<bool> {
        match self {
            Self::NoRestart | Self::PartialRestart => Some(true),
            Self::FullRestart => Some(false),
            Self::Undetermined => None,
        }
    }
}

/// Three ordered lists of literal substrings, one per decision category.
/// Checked in declaration order: no-restart outranks full-restart outranks
/// partial-restart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub no_restart: Vec<String>,
    pub full_restart: Vec<String>,
    pub partial_restart: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            no_restart: vec!["fix conflicts and then commit the result.".to_string()],
            full_restart: vec!["Try re-running the entire matrix.".to_string()],
            partial_restart: vec![
                "If the deploy key is not present in the repository, you can use the \
                 \"Reset Project\" button on the project settings page to restore it."
                    .to_string(),
                "OutOfMemoryException".to_string(),
                "ERROR: 500: error: instance token not unique".to_string(),
                "Failed to create vault token for this job.".to_string(),
                "ERROR: Tests aborted after exceeding the".to_string(),
                "ERROR: Failed transfer: ".to_string(),
            ],
        }
    }
}

impl PatternConfig {
    /// Load overrides from a JSON file. Categories the file omits keep their
    /// built-in lists.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;

        serde_json::from_str(&raw)
            .map_err(|e| PrKitError::Config(format!("Invalid pattern file {}: {e}", path.display())))
    }
}

/// A job paired with its fully downloaded console text.
#[derive(Debug, Clone)]
pub struct JobConsole {
    pub job: Job,
    pub console: String,
}

/// Decide whether a run should be restarted, and how.
///
/// A run with zero tests short-circuits to a full restart before any console
/// is inspected. Otherwise jobs are scanned in the given order; for each
/// console the categories are checked no-restart first, then full-restart,
/// then partial-restart, and the first matching pattern decides. Pure
/// function of its inputs; the only observable side effect is a log line
/// naming the matched pattern.
pub fn classify(run: &Run, jobs_with_logs: &[JobConsole], patterns: &PatternConfig) -> RestartDecision {
    if run.total_tests == 0 {
        info!("Nothing has been run");
        return RestartDecision::FullRestart;
    }

    let categories = [
        (&patterns.no_restart, RestartDecision::NoRestart),
        (&patterns.full_restart, RestartDecision::FullRestart),
        (&patterns.partial_restart, RestartDecision::PartialRestart),
    ];

    for entry in jobs_with_logs {
        for (category, decision) in &categories {
            if let Some(pattern) = category
                .iter()
                .find(|pattern| entry.console.contains(pattern.as_str()))
            {
                info!("Pattern found in job {}: {pattern}", entry.job.id);
                return *decision;
            }
        }
    }

    RestartDecision::Undetermined
}
