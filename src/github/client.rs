use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use url::Url;

use super::types::{CommitStatus, NewPullRequest, PullRequest};
use crate::auth::Token;
use crate::error::{PrKitError, Result};
use crate::http::read_json;

pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Token,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent("prkit/0.2.0")
            .build()
            .map_err(|e| PrKitError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut api_url = Url::parse(base_url)
            .map_err(|e| PrKitError::Config(format!("Invalid GitHub base URL: {e}")))?;
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
            .header(AUTHORIZATION, format!("token {}", self.token.as_str()))
            .header(ACCEPT, "application/vnd.github+json")
    }

    fn pulls_url(&self, org: &str, repo: &str) -> Result<Url> {
        self.api_url
            .join(&format!("repos/{org}/{repo}/pulls"))
            .map_err(|e| PrKitError::Config(format!("Invalid pulls URL: {e}")))
    }

    /// Fetch a single pull request
    pub async fn get_pull_request(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest> {
        let url = self
            .api_url
            .join(&format!("repos/{org}/{repo}/pulls/{number}"))
            .map_err(|e| PrKitError::Config(format!("Invalid pull request URL: {e}")))?;

        let request = self.auth_request(self.client.get(url));
        let response = request.send().await?.error_for_status()?;

        read_json(response).await
    }

    /// List commit statuses via the `statuses_url` carried by the pull
    /// request payload, newest first
    pub async fn get_statuses(&self, statuses_url: &str) -> Result<Vec<CommitStatus>> {
        let url = Url::parse(statuses_url)
            .map_err(|e| PrKitError::Api(format!("Invalid statuses URL: {e}")))?;

        let request = self.auth_request(self.client.get(url));
        let response = request.send().await?.error_for_status()?;

        read_json(response).await
    }

    /// Open a new pull request
    pub async fn create_pull_request(
        &self,
        org: &str,
        repo: &str,
        new_pr: &NewPullRequest,
    ) -> Result<PullRequest> {
        let url = self.pulls_url(org, repo)?;

        let request = self.auth_request(self.client.post(url).json(new_pr));
        let response = request.send().await?.error_for_status()?;

        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PR_BODY: &str = r#"{
        "number": 42,
        "title": "Fix timeout handling",
        "html_url": "https://github.com/ansible/ansible/pull/42",
        "statuses_url": "https://api.github.com/repos/ansible/ansible/statuses/abc123",
        "head": {"sha": "abc123", "ref": "fix/timeout"}
    }"#;

    fn client(server: &mockito::Server) -> GitHubClient {
        GitHubClient::new(&server.url(), Token::from("gh-token")).unwrap()
    }

    #[tokio::test]
    async fn test_get_pull_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/ansible/ansible/pulls/42")
            .match_header("authorization", "token gh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PR_BODY)
            .create_async()
            .await;

        let pr = client(&server)
            .get_pull_request("ansible", "ansible", 42)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.number, 42);
        assert_eq!(pr.head.sha, "abc123");
        assert_eq!(pr.head.ref_, "fix/timeout");
    }

    #[tokio::test]
    async fn test_get_pull_request_malformed_payload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/ansible/ansible/pulls/42")
            .with_status(200)
            .with_body(r#"{"number": "not-a-number"}"#)
            .create_async()
            .await;

        let result = client(&server).get_pull_request("ansible", "ansible", 42).await;

        assert!(matches!(result, Err(PrKitError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_get_statuses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/ansible/ansible/statuses/abc123")
            .with_status(200)
            .with_body(
                r#"[
                    {"context": "Shippable", "state": "failure"},
                    {"context": "docs", "state": "success"}
                ]"#,
            )
            .create_async()
            .await;

        let statuses = client(&server)
            .get_statuses(&format!("{}/repos/ansible/ansible/statuses/abc123", server.url()))
            .await
            .unwrap();

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].context, "Shippable");
        assert_eq!(statuses[0].state, "failure");
    }

    #[tokio::test]
    async fn test_create_pull_request_sends_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/ansible/ansible/pulls")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "title": "Fix timeout handling",
                "head": "user:fix/timeout",
                "base": "devel",
                "body": "##### SUMMARY\nFix it"
            })))
            .with_status(201)
            .with_body(PR_BODY)
            .create_async()
            .await;

        let new_pr = NewPullRequest {
            title: "Fix timeout handling".to_string(),
            head: "user:fix/timeout".to_string(),
            base: "devel".to_string(),
            body: "##### SUMMARY\nFix it".to_string(),
        };

        let pr = client(&server)
            .create_pull_request("ansible", "ansible", &new_pr)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pr.html_url, "https://github.com/ansible/ansible/pull/42");
    }

    #[tokio::test]
    async fn test_http_error_status_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/ansible/ansible/pulls/42")
            .with_status(404)
            .create_async()
            .await;

        let result = client(&server).get_pull_request("ansible", "ansible", 42).await;

        assert!(matches!(result, Err(PrKitError::Network(_))));
    }
}
