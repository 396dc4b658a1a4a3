mod client;
mod types;

pub use client::GitHubClient;
pub use types::{CommitStatus, NewPullRequest, PullRequest};
