//! Repository service integration for nag-bot.
//!
//! This module provides functionality for reading open pull requests:
//! - Fetching the open pull requests of a single repository
//! - Aggregating them across every configured repository, in configured order
//!
//! It defines the `GenericRepoClient` trait that can be implemented for different
//! repository servers, with a default implementation for Bitbucket Server (Stash).

pub mod stash;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::base::types::{AggregationResult, FetchMode, ReviewRequest};

// Errors.

/// Failure to fetch the pull requests of one repository.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent, or timed out.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    /// The body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

// Traits.

/// Generic "repository" trait that clients must implement.
#[async_trait]
pub trait GenericRepoClient: Send + Sync + 'static {
    /// Fetch the open pull requests of one repository, in server order.
    ///
    /// Implementations must drop closed entries.
    async fn fetch_review_requests(&self, repository_id: &str) -> Result<Vec<ReviewRequest>, FetchError>;
}

// Structs.

/// The result of fetching one repository.
#[derive(Debug)]
pub struct RepoOutcome {
    pub repository: String,
    pub result: Result<Vec<ReviewRequest>, FetchError>,
}

/// Repository client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct RepoClient {
    inner: Arc<dyn GenericRepoClient>,
}

impl Deref for RepoClient {
    type Target = dyn GenericRepoClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl RepoClient {
    pub fn new(inner: Arc<dyn GenericRepoClient>) -> Self {
        Self { inner }
    }

    /// Fetch every repository with the chosen discipline.
    ///
    /// Outcomes are returned in `repositories` order, whatever the completion order.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self, repositories: &[String], mode: FetchMode) -> Vec<RepoOutcome> {
        match mode {
            FetchMode::Parallel => {
                let tasks = repositories.iter().map(|repository| async move {
                    RepoOutcome {
                        repository: repository.clone(),
                        result: self.fetch_review_requests(repository).await,
                    }
                });

                futures::future::join_all(tasks).await
            }
            FetchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(repositories.len());

                for repository in repositories {
                    let result = self.fetch_review_requests(repository).await;
                    outcomes.push(RepoOutcome { repository: repository.clone(), result });
                }

                outcomes
            }
        }
    }

    /// Fetch and merge the open pull requests of every repository.
    ///
    /// A failing repository is logged and contributes nothing; the others still count.
    #[instrument(skip(self))]
    pub async fn aggregate(&self, repositories: &[String], mode: FetchMode) -> AggregationResult {
        let mut aggregation = AggregationResult::default();

        for outcome in self.fetch_all(repositories, mode).await {
            match outcome.result {
                Ok(requests) => {
                    info!("Repository `{}` has {} open pull request(s).", outcome.repository, requests.len());
                    aggregation.requests.extend(requests);
                }
                Err(err) => {
                    error!("Failed to fetch pull requests for `{}`: {}", outcome.repository, err);
                    aggregation.failed_repositories.push(outcome.repository);
                }
            }
        }

        aggregation
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex, time::Duration};

    use chrono::{TimeZone, Utc};

    use super::*;

    /// Fake server with per-repository delays and canned answers.
    struct FakeRepoClient {
        delays: HashMap<String, Duration>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRepoClient {
        fn new(delays: &[(&str, u64)], failing: &[&str]) -> Self {
            Self {
                delays: delays.iter().map(|(r, ms)| (r.to_string(), Duration::from_millis(*ms))).collect(),
                failing: failing.iter().map(|r| r.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenericRepoClient for FakeRepoClient {
        async fn fetch_review_requests(&self, repository_id: &str) -> Result<Vec<ReviewRequest>, FetchError> {
            self.calls.lock().unwrap().push(repository_id.to_string());

            if let Some(delay) = self.delays.get(repository_id) {
                tokio::time::sleep(*delay).await;
            }

            if self.failing.iter().any(|r| r == repository_id) {
                return Err(FetchError::Transport("connection refused".to_string()));
            }

            Ok((1..=2)
                .map(|i| ReviewRequest {
                    title: format!("{repository_id}-{i}"),
                    created_at: Utc.with_ymd_and_hms(2024, 1, i, 0, 0, 0).unwrap(),
                    web_link: format!("{repository_id}/{i}"),
                    is_open: true,
                })
                .collect())
        }
    }

    fn repos(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn titles(result: &AggregationResult) -> Vec<&str> {
        result.requests.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_parallel_preserves_repository_order() {
        let client = RepoClient::new(Arc::new(FakeRepoClient::new(&[("a", 100)], &[])));

        let result = client.aggregate(&repos(&["a", "b"]), FetchMode::Parallel).await;

        assert_eq!(titles(&result), vec!["a-1", "a-2", "b-1", "b-2"]);
        assert!(result.failed_repositories.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_fetches_in_order() {
        let fake = Arc::new(FakeRepoClient::new(&[("a", 20)], &[]));
        let client = RepoClient::new(fake.clone());

        let result = client.aggregate(&repos(&["a", "b", "c"]), FetchMode::Sequential).await;

        assert_eq!(titles(&result), vec!["a-1", "a-2", "b-1", "b-2", "c-1", "c-2"]);
        assert_eq!(*fake.calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        for mode in [FetchMode::Parallel, FetchMode::Sequential] {
            let client = RepoClient::new(Arc::new(FakeRepoClient::new(&[], &["a"])));

            let result = client.aggregate(&repos(&["a", "b"]), mode).await;

            assert_eq!(titles(&result), vec!["b-1", "b-2"]);
            assert_eq!(result.failed_repositories, vec!["a"]);
        }
    }

    #[tokio::test]
    async fn test_empty_repository_set_fetches_nothing() {
        let fake = Arc::new(FakeRepoClient::new(&[], &[]));
        let client = RepoClient::new(fake.clone());

        let result = client.aggregate(&[], FetchMode::Parallel).await;

        assert!(result.is_empty());
        assert!(fake.calls.lock().unwrap().is_empty());
    }
}
