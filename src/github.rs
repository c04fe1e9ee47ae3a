use jiff::Timestamp;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RepoId;
use crate::data::{CommitDetail, CommitItem, PullRequestDetail, PullRequestItem, Repository};
use crate::paging::Pages;
use crate::report::{ActivityReport, CommitSummary, PullRequestSummary};
use crate::transport::{FetchError, Transport};

/// Items requested per list page
pub const PER_PAGE: usize = 50;

/// A failure that aborts the whole run
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to resolve the default branch of {repo}: {source}")]
    DefaultBranch { repo: RepoId, source: FetchError },

    #[error("failed to list pull requests of {repo}: {source}")]
    PullRequests { repo: RepoId, source: FetchError },

    #[error("failed to list commits on {branch}: {source}")]
    Commits { branch: String, source: FetchError },
}

/// Collects recent repository activity through a [`Transport`]
pub struct GitHub<T> {
    transport: T,
    per_page: usize,
    fetch_details: bool,
}

impl<T: Transport> GitHub<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            per_page: PER_PAGE,
            fetch_details: true,
        }
    }

    /// Whether to make one extra request per item for size metrics
    pub fn fetch_details(mut self, enabled: bool) -> Self {
        self.fetch_details = enabled;
        self
    }

    #[cfg(test)]
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, FetchError> {
        let value = self.transport.get(path, &[])?;
        serde_json::from_value(value).map_err(|source| FetchError::Decode {
            path: path.to_owned(),
            source,
        })
    }

    fn pages<I: DeserializeOwned>(
        &self,
        path: String,
        query: Vec<(&'static str, String)>,
    ) -> Pages<'_, T, I> {
        Pages::new(&self.transport, path, query, self.per_page)
    }

    pub fn resolve_default_branch(&self, repo: &RepoId) -> Result<String, FetchError> {
        let repository: Repository = self.get(&repo.api_path())?;
        Ok(repository.default_branch)
    }

    /// Pull requests updated at or after `since`, most recently updated first.
    ///
    /// The listing is sorted by update time descending, so the first item
    /// older than `since` ends the walk without requesting further pages.
    pub fn collect_pull_requests(
        &self,
        repo: &RepoId,
        since: Timestamp,
    ) -> Result<Vec<PullRequestSummary>, FetchError> {
        let query = vec![
            ("state", "all".to_owned()),
            ("sort", "updated".to_owned()),
            ("direction", "desc".to_owned()),
        ];

        let mut prs = Vec::new();
        let mut previous: Option<Timestamp> = None;

        'pages: for page in self.pages::<PullRequestItem>(format!("{}/pulls", repo.api_path()), query) {
            for item in page? {
                if previous.is_some_and(|previous| item.updated_at > previous) {
                    warn!(
                        pr = item.number,
                        updated_at = %item.updated_at,
                        "pull request listing is not sorted by update time; older items may be missed"
                    );
                }
                previous = Some(item.updated_at);

                if item.updated_at < since {
                    debug!(pr = item.number, updated_at = %item.updated_at, "reached cutoff");
                    break 'pages;
                }

                let detail = self.pull_request_detail(repo, item.number);
                prs.push(PullRequestSummary::new(item, detail));
            }
        }

        Ok(prs)
    }

    fn pull_request_detail(&self, repo: &RepoId, number: u64) -> Option<PullRequestDetail> {
        if !self.fetch_details {
            return None;
        }
        match self.get(&format!("{}/pulls/{number}", repo.api_path())) {
            Ok(detail) => Some(detail),
            Err(err) => {
                warn!(pr = number, "failed to fetch pull request details: {err}");
                None
            }
        }
    }

    /// Commits on `branch` authored at or after `since`, newest first.
    pub fn collect_commits(
        &self,
        repo: &RepoId,
        branch: &str,
        since: Timestamp,
    ) -> Result<Vec<CommitSummary>, FetchError> {
        let query = vec![("sha", branch.to_owned()), ("since", since.to_string())];

        let mut commits = Vec::new();
        for page in self.pages::<CommitItem>(format!("{}/commits", repo.api_path()), query) {
            for item in page? {
                let Some(date) = item.timestamp() else {
                    debug!(sha = %item.sha, "skipping commit without author or committer date");
                    continue;
                };
                if date < since {
                    debug!(sha = %item.sha, %date, "skipping commit older than cutoff");
                    continue;
                }

                let detail = self.commit_detail(repo, &item.sha);
                commits.push(CommitSummary::new(item, date, detail));
            }
        }

        Ok(commits)
    }

    fn commit_detail(&self, repo: &RepoId, sha: &str) -> Option<CommitDetail> {
        if !self.fetch_details {
            return None;
        }
        match self.get(&format!("{}/commits/{sha}", repo.api_path())) {
            Ok(detail) => Some(detail),
            Err(err) => {
                warn!(sha, "failed to fetch commit stats: {err}");
                None
            }
        }
    }

    /// Everything that goes into the report. Commits are read from `branch`,
    /// or from the repository's default branch when `branch` is `None`.
    pub fn collect_activity(
        &self,
        repo: &RepoId,
        since: Timestamp,
        branch: Option<&str>,
    ) -> Result<ActivityReport, CollectError> {
        let branch = match branch {
            Some(branch) => branch.to_owned(),
            None => self
                .resolve_default_branch(repo)
                .map_err(|source| CollectError::DefaultBranch {
                    repo: repo.clone(),
                    source,
                })?,
        };
        info!(%repo, %branch, %since, "collecting activity");

        let prs = self
            .collect_pull_requests(repo, since)
            .map_err(|source| CollectError::PullRequests {
                repo: repo.clone(),
                source,
            })?;
        info!(count = prs.len(), "collected pull requests");

        let commits = self
            .collect_commits(repo, &branch, since)
            .map_err(|source| CollectError::Commits {
                branch: branch.clone(),
                source,
            })?;
        info!(count = commits.len(), "collected commits");

        Ok(ActivityReport {
            repo: repo.to_string(),
            since,
            prs,
            commits,
        })
    }
}
