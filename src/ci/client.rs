use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::types::{Job, JobStatus, Run};
use crate::auth::Token;
use crate::error::{PrKitError, Result};
use crate::http::read_json;

pub struct CiClient {
    client: Client,
    api_url: Url,
    token: Token,
}

#[derive(Debug, Deserialize)]
struct Project {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewBuildRequest<'a> {
    is_debug: bool,
    project_id: &'a str,
    rerun_failed_only: bool,
    run_id: &'a str,
}

impl CiClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent("prkit/0.2.0")
            .build()
            .map_err(|e| PrKitError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut api_url = Url::parse(base_url)
            .map_err(|e| PrKitError::Config(format!("Invalid CI base URL: {e}")))?;
        // Url::join treats a path without a trailing slash as a file
        if !api_url.path().ends_with('/') {
            api_url.set_path(&format!("{}/", api_url.path()));
        }

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("apiToken {}", self.token.as_str()))
            .header(ACCEPT, "application/json")
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| PrKitError::Config(format!("Invalid CI endpoint '{path}': {e}")))
    }

    /// Resolve a project's id from its "org/repo" full name
    pub async fn get_project_id(&self, project_full_name: &str) -> Result<String> {
        let url = self.endpoint("projects")?;
        let request = self.auth_request(
            self.client
                .get(url)
                .query(&[("projectFullNames", project_full_name)]),
        );

        let response = request.send().await?.error_for_status()?;
        let projects: Vec<Project> = read_json(response).await?;

        projects
            .into_iter()
            .next()
            .map(|project| project.id)
            .ok_or_else(|| PrKitError::Api(format!("Project '{project_full_name}' not found")))
    }

    /// Fetch the run for a commit SHA
    pub async fn get_run_by_commit(&self, commit_sha: &str) -> Result<Run> {
        let url = self.endpoint("runs")?;
        let request = self.auth_request(self.client.get(url).query(&[("commitShas", commit_sha)]));

        let response = request.send().await?.error_for_status()?;
        let runs: Vec<Run> = read_json(response).await?;

        runs.into_iter()
            .next()
            .ok_or_else(|| PrKitError::Api(format!("No run found for commit {commit_sha}")))
    }

    /// List a run's jobs, filtered to the given statuses
    pub async fn get_jobs(&self, run_id: &str, statuses: &[JobStatus]) -> Result<Vec<Job>> {
        let status_filter = statuses
            .iter()
            .map(|status| status.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let url = self.endpoint("jobs")?;
        let request = self.auth_request(
            self.client
                .get(url)
                .query(&[("runIds", run_id), ("status", &status_filter)]),
        );

        let response = request.send().await?.error_for_status()?;
        read_json(response).await
    }

    /// Download a job's full console text
    pub async fn get_job_console(&self, job_id: &str) -> Result<String> {
        let url = self.endpoint(&format!("jobs/{job_id}/consoles"))?;
        let request = self.auth_request(self.client.get(url).query(&[("download", "true")]));

        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Request a new build for an existing run
    pub async fn trigger_new_build(
        &self,
        run_id: &str,
        project_id: &str,
        rerun_failed_only: bool,
    ) -> Result<Run> {
        let url = self.endpoint(&format!("projects/{project_id}/newBuild"))?;
        let body = NewBuildRequest {
            is_debug: false,
            project_id,
            rerun_failed_only,
            run_id,
        };

        let request = self.auth_request(self.client.post(url).json(&body));
        let response = request.send().await?.error_for_status()?;

        read_json(response).await
    }
}
