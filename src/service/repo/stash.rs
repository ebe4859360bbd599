//! Bitbucket Server (Stash) implementation of the repository client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::base::{
    config::Config,
    types::{Res, ReviewRequest},
};

use super::{FetchError, GenericRepoClient, RepoClient};

// Extra methods on `RepoClient` applied by the stash implementation.

impl RepoClient {
    /// Creates a new Stash repository client.
    pub fn stash(config: &Config) -> Res<Self> {
        let client = StashRepoClient::new(config)?;
        Ok(Self::new(Arc::new(client)))
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
struct PullRequestPage {
    values: Vec<StashPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StashPullRequest {
    title: String,
    /// Milliseconds since the epoch.
    created_date: i64,
    open: bool,
    link: StashLink,
}

#[derive(Debug, Deserialize)]
struct StashLink {
    url: String,
}

impl TryFrom<StashPullRequest> for ReviewRequest {
    type Error = FetchError;

    fn try_from(pr: StashPullRequest) -> Result<Self, Self::Error> {
        let created_at = DateTime::<Utc>::from_timestamp_millis(pr.created_date)
            .ok_or_else(|| FetchError::Malformed(format!("invalid createdDate `{}`", pr.created_date)))?;

        Ok(Self {
            title: pr.title,
            created_at,
            web_link: pr.link.url,
            is_open: pr.open,
        })
    }
}

// Specific implementations.

/// Stash client implementation.
#[derive(Clone)]
pub struct StashRepoClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_version: String,
    authorization: String,
}

impl StashRepoClient {
    /// Create a new Stash client.
    #[instrument(name = "StashRepoClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().timeout(config.fetch_timeout()).build()?;

        Ok(Self {
            http,
            base_url: config.stash_url.trim_end_matches('/').to_string(),
            project_id: config.stash_project_id.clone(),
            api_version: config.stash_api_version.clone(),
            authorization: config.stash_authorization.clone(),
        })
    }

    /// The pull request listing endpoint of one repository.
    pub fn pull_requests_url(&self, repository_id: &str) -> String {
        format!(
            "{}/rest/api/{}/projects/{}/repos/{}/pull-requests",
            self.base_url, self.api_version, self.project_id, repository_id
        )
    }
}

#[async_trait]
impl GenericRepoClient for StashRepoClient {
    #[instrument(skip(self))]
    async fn fetch_review_requests(&self, repository_id: &str) -> Result<Vec<ReviewRequest>, FetchError> {
        let url = self.pull_requests_url(repository_id);

        let response = self
            .http
            .get(&url)
            .header("Authorization", &self.authorization)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        debug!("Received {} bytes from `{}`.", body.len(), url);

        parse_open_review_requests(&body)
    }
}

// Helpers.

/// Decodes a pull request page, keeping open entries in server order.
pub fn parse_open_review_requests(body: &str) -> Result<Vec<ReviewRequest>, FetchError> {
    let page: PullRequestPage = serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    page.values.into_iter().filter(|pr| pr.open).map(ReviewRequest::try_from).collect()
}

// Tests.
