use futures::future::join_all;
use log::{info, warn};

use super::classify::{classify, JobConsole, PatternConfig, RestartDecision};
use super::client::CiClient;
use super::types::{JobStatus, Run};
use crate::error::{PrKitError, Result};
use crate::github::GitHubClient;

/// Job statuses whose consoles are inspected for failure signatures
const RESTART_CANDIDATE_STATUSES: [JobStatus; 3] =
    [JobStatus::Failed, JobStatus::Timeout, JobStatus::Unstable];

pub struct RetriggerOptions {
    pub org: String,
    pub repo: String,
    pub pr_number: u64,
    /// Commit status context identifying the CI service
    pub status_context: String,
    /// Re-run the whole matrix without classifying
    pub force_full_rerun: bool,
}

#[derive(Debug)]
pub enum RetriggerOutcome {
    Triggered {
        run: Run,
        rerun_failed_only: bool,
    },
    /// Classification said to leave the run alone (manual action needed, or
    /// no known signature matched)
    NotRestarted {
        decision: RestartDecision,
    },
    StatusNotFailure {
        state: String,
    },
    StillRunning {
        run_number: u64,
    },
}

/// Console page of a run, as shown to the operator after a trigger
pub fn console_url(ci_base: &str, project_full_name: &str, run_number: u64) -> String {
    format!(
        "{}/github/{project_full_name}/runs/{run_number}/summary/console",
        ci_base.trim_end_matches('/')
    )
}

/// Inspect a pull request's CI run and restart it if its failure logs match
/// a known signature.
pub async fn run_retrigger(
    github: &GitHubClient,
    ci: &CiClient,
    patterns: &PatternConfig,
    opts: &RetriggerOptions,
) -> Result<RetriggerOutcome> {
    let project_full_name = format!("{}/{}", opts.org, opts.repo);

    let pr = github
        .get_pull_request(&opts.org, &opts.repo, opts.pr_number)
        .await?;
    info!("Inspecting PR #{} ({})", pr.number, pr.head.ref_);

    let statuses = github.get_statuses(&pr.statuses_url).await?;
    // Statuses arrive newest first; take the newest one for our context
    let current = statuses
        .iter()
        .find(|status| status.context == opts.status_context)
        .ok_or_else(|| {
            PrKitError::Api(format!(
                "No '{}' status on PR #{}",
                opts.status_context, opts.pr_number
            ))
        })?;

    if !opts.force_full_rerun && current.state != "failure" {
        return Ok(RetriggerOutcome::StatusNotFailure {
            state: current.state.clone(),
        });
    }

    let run = ci.get_run_by_commit(&pr.head.sha).await?;
    if run.ended_at.is_none() {
        return Ok(RetriggerOutcome::StillRunning {
            run_number: run.run_number,
        });
    }

    let decision = if opts.force_full_rerun {
        RestartDecision::FullRestart
    } else {
        let jobs = ci.get_jobs(&run.id, &RESTART_CANDIDATE_STATUSES).await?;
        if jobs.is_empty() {
            warn!("Run {} has no failed jobs to inspect", run.run_number);
        }

        info!("Downloading consoles for {} jobs...", jobs.len());
        let consoles = join_all(jobs.iter().map(|job| ci.get_job_console(&job.id))).await;

        let mut jobs_with_logs = Vec::with_capacity(jobs.len());
        for (job, console) in jobs.into_iter().zip(consoles) {
            jobs_with_logs.push(JobConsole {
                job,
                console: console?,
            });
        }

        classify(&run, &jobs_with_logs, patterns)
    };

    let rerun_failed_only = match decision.rerun_failed_only() {
        Some(rerun_failed_only) if decision.needs_restart() => rerun_failed_only,
        _ => return Ok(RetriggerOutcome::NotRestarted { decision }),
    };

    let project_id = ci.get_project_id(&project_full_name).await?;
    let new_run = ci
        .trigger_new_build(&run.id, &project_id, rerun_failed_only)
        .await?;
    info!(
        "Triggered run {} (rerun_failed_only: {rerun_failed_only})",
        new_run.run_number
    );

    Ok(RetriggerOutcome::Triggered {
        run: new_run,
        rerun_failed_only,
    })
}
