use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: Option<String>,
    pub html_url: String,
    pub statuses_url: String,
    pub head: PullRequestHead,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestHead {
    pub sha: String,
    #[serde(rename = "ref")]
    pub ref_: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitStatus {
    pub context: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}
