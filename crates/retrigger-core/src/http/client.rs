//! Drone REST API client

use crate::error::{Error, Result};
use crate::repo::RepoId;
use crate::traits::BuildServer;
use crate::types::{Build, Params, EVENT_DEPLOYMENT};
use std::future::Future;
use std::time::Duration;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Drone API client authenticated with a bearer token
pub struct DroneClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for DroneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DroneClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl DroneClient {
    /// Create a new client for the server at `base_url`
    pub fn new(base_url: &str, token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("retrigger/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Runtime(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Server address without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn builds_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/api/repos/{}/{}/builds",
            self.base_url, repo.owner, repo.name
        )
    }

    /// POST to a build and decode the build it creates
    async fn post_build(
        &self,
        repo: &RepoId,
        number: u64,
        query: Vec<(&str, &str)>,
    ) -> Result<Build> {
        let url = format!("{}/{}", self.builds_url(repo), number);

        let response = self
            .client
            .post(&url)
            .query(&query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("failed to trigger build {}: {}", number, e)))?;

        let response = check_status(response).await?;
        response
            .json::<Build>()
            .await
            .map_err(|e| Error::Decode(format!("failed to parse build response: {}", e)))
    }
}

/// Map non-success statuses to errors, keeping the server's message
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    };

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Err(Error::Unauthorized(detail))
    } else {
        Err(Error::Server(detail))
    }
}

impl BuildServer for DroneClient {
    /// Endpoint: GET /api/repos/{owner}/{name}/builds
    fn list_builds<'a>(
        &'a self,
        repo: &'a RepoId,
    ) -> impl Future<Output = Result<Vec<Build>>> + Send + 'a {
        async move {
            let response = self
                .client
                .get(self.builds_url(repo))
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| Error::Transport(format!("failed to list builds: {}", e)))?;

            let response = check_status(response).await?;
            let builds: Vec<Build> = response
                .json()
                .await
                .map_err(|e| Error::Decode(format!("failed to parse builds response: {}", e)))?;

            tracing::debug!(repo = %repo, count = builds.len(), "listed builds");
            Ok(builds)
        }
    }

    /// Endpoint: POST /api/repos/{owner}/{name}/builds/{number}?{params}
    fn start_build<'a>(
        &'a self,
        repo: &'a RepoId,
        number: u64,
        params: &'a Params,
    ) -> impl Future<Output = Result<Build>> + Send + 'a {
        async move {
            let query: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            self.post_build(repo, number, query).await
        }
    }

    /// Endpoint: POST /api/repos/{owner}/{name}/builds/{number}?{params}&event=deployment&deploy_to={environment}
    fn deploy<'a>(
        &'a self,
        repo: &'a RepoId,
        number: u64,
        environment: &'a str,
        params: &'a Params,
    ) -> impl Future<Output = Result<Build>> + Send + 'a {
        async move {
            let mut query: Vec<(&str, &str)> = params
                .iter()
                .filter(|(k, _)| k.as_str() != "event" && k.as_str() != "deploy_to")
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            query.push(("event", EVENT_DEPLOYMENT));
            query.push(("deploy_to", environment));
            self.post_build(repo, number, query).await
        }
    }
}
