use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::auth;
use crate::ci::{self, CiClient, PatternConfig, RestartDecision, RetriggerOptions, RetriggerOutcome};
use crate::git::GitRepo;
use crate::github::{GitHubClient, NewPullRequest};
use crate::template::{self, PrDescription, DEFAULT_BODY_TEMPLATE};

#[derive(Parser)]
#[command(name = "prkit")]
#[command(author, version, about = "Pull request contribution workflow helpers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push a branch to a remote
    Push {
        /// Path to the local repository
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Remote to push to
        #[arg(short, long, default_value = "origin")]
        remote: String,

        /// Branch to push (defaults to the checked-out branch)
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Open a pull request with a templated description
    Pr {
        /// Organization owning the target repository
        #[arg(short, long, default_value = "ansible")]
        org: String,

        /// Target repository name
        #[arg(short, long, default_value = "ansible")]
        repo: String,

        /// Head branch ("user:branch" for forks)
        #[arg(long)]
        head: String,

        /// Base branch
        #[arg(long, default_value = "devel")]
        base: String,

        /// Pull request title
        #[arg(short, long)]
        title: String,

        /// Summary section of the pull request body
        #[arg(short, long)]
        summary: String,

        /// Issue type section of the pull request body
        #[arg(long, default_value = "Bugfix Pull Request")]
        issue_type: String,

        /// Component name section of the pull request body
        #[arg(short, long)]
        component: Option<String>,

        /// Handlebars file overriding the built-in body template
        #[arg(long)]
        template: Option<PathBuf>,

        /// GitHub API base URL
        #[arg(long, default_value = "https://api.github.com")]
        github_url: String,

        /// GitHub API token (falls back to ~/.github_api)
        #[arg(long, env = "GITHUB_TOKEN")]
        token: Option<String>,
    },

    /// Re-trigger the CI run of a failed pull request
    Retrigger {
        /// Pull request number
        #[arg(short, long)]
        pr: u64,

        /// Organization owning the target repository
        #[arg(long, default_value = "ansible")]
        org: String,

        /// Target repository name
        #[arg(long, default_value = "ansible")]
        repo: String,

        /// Re-run the entire matrix even if CI has not failed
        #[arg(short, long, default_value_t = false)]
        rerun: bool,

        /// Commit status context to inspect
        #[arg(long, default_value = "Shippable")]
        context: String,

        /// GitHub API base URL
        #[arg(long, default_value = "https://api.github.com")]
        github_url: String,

        /// CI API base URL
        #[arg(long, default_value = "https://api.shippable.com/")]
        ci_url: String,

        /// GitHub API token (falls back to ~/.github_api)
        #[arg(long, env = "GITHUB_TOKEN")]
        token: Option<String>,

        /// CI API token (falls back to ~/.shippable_api)
        #[arg(long, env = "CI_API_TOKEN")]
        ci_token: Option<String>,

        /// JSON file overriding the built-in failure patterns
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Push {
                path,
                remote,
                branch,
            } => {
                let repo = GitRepo::open(path).await?;
                let branch = match branch {
                    Some(branch) => branch.clone(),
                    None => repo.current_branch().await?,
                };

                let remote_url = repo.remote_url(remote).await?;
                info!("Pushing {branch} to {remote} ({remote_url})");
                repo.push(remote, &branch).await?;

                println!("Pushed {branch} to {remote}");
                Ok(())
            }

            Commands::Pr {
                org,
                repo,
                head,
                base,
                title,
                summary,
                issue_type,
                component,
                template,
                github_url,
                token,
            } => {
                let token = auth::resolve_github_token(token.as_deref())?;
                let github = GitHubClient::new(github_url, token)?;

                let template_source = match template {
                    Some(path) => std::fs::read_to_string(path)?,
                    None => DEFAULT_BODY_TEMPLATE.to_string(),
                };
                let description = PrDescription {
                    summary: summary.clone(),
                    issue_type: issue_type.clone(),
                    component: component.clone(),
                };
                let body = template::render_body(&template_source, &description)?;

                let new_pr = NewPullRequest {
                    title: title.clone(),
                    head: head.clone(),
                    base: base.clone(),
                    body,
                };

                info!("Opening pull request '{title}' ({base} <- {head})");
                let pr = github.create_pull_request(org, repo, &new_pr).await?;

                println!("Created pull request #{}: {}", pr.number, pr.html_url);
                Ok(())
            }

            Commands::Retrigger {
                pr,
                org,
                repo,
                rerun,
                context,
                github_url,
                ci_url,
                token,
                ci_token,
                patterns,
            } => {
                let github =
                    GitHubClient::new(github_url, auth::resolve_github_token(token.as_deref())?)?;
                let ci_client = CiClient::new(ci_url, auth::resolve_ci_token(ci_token.as_deref())?)?;

                let patterns = match patterns {
                    Some(path) => PatternConfig::from_file(path)?,
                    None => PatternConfig::default(),
                };

                let opts = RetriggerOptions {
                    org: org.clone(),
                    repo: repo.clone(),
                    pr_number: *pr,
                    status_context: context.clone(),
                    force_full_rerun: *rerun,
                };

                let outcome = ci::run_retrigger(&github, &ci_client, &patterns, &opts).await?;

                match outcome {
                    RetriggerOutcome::Triggered {
                        run,
                        rerun_failed_only,
                    } => {
                        let scope = if rerun_failed_only {
                            "failed jobs only"
                        } else {
                            "entire matrix"
                        };
                        println!(
                            "New run triggered ({scope}) - {}",
                            ci::console_url(ci_url, &format!("{org}/{repo}"), run.run_number)
                        );
                    }
                    RetriggerOutcome::NotRestarted { decision } => match decision {
                        RestartDecision::NoRestart => {
                            println!("Run needs manual action (merge conflict or similar); not restarting");
                        }
                        _ => {
                            println!(
                                "No known failure signature matched; leaving the run alone. \
                                 Inspect the console or force with --rerun."
                            );
                        }
                    },
                    RetriggerOutcome::StatusNotFailure { state } => {
                        println!("PR #{pr} CI status is '{state}', not 'failure'; nothing to do");
                    }
                    RetriggerOutcome::StillRunning { run_number } => {
                        println!("Run {run_number} is still running...");
                    }
                }
                Ok(())
            }
        }
    }
}
