use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use crate::data::{CommitDetail, CommitItem, PullRequestDetail, PullRequestItem, PullRequestState};

/// The JSON document written to stdout
#[derive(Debug, Serialize)]
pub struct ActivityReport {
    pub repo: String,
    pub since: Timestamp,
    pub prs: Vec<PullRequestSummary>,
    pub commits: Vec<CommitSummary>,
}

/// One pull request. `additions` through `head_ref` come from the detail
/// request and are null when it failed or was skipped.
#[derive(Debug, Serialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub user_login: Option<String>,
    pub user_html_url: Option<String>,
    pub state: PullRequestState,
    pub merged: bool,
    pub updated_at: Timestamp,
    pub html_url: String,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub changed_files: Option<u64>,
    pub commits: Option<u64>,
    pub mergeable_state: Option<String>,
    pub merged_at: Option<Timestamp>,
    pub base_ref: Option<String>,
    pub head_ref: Option<String>,
}

impl PullRequestSummary {
    pub fn new(item: PullRequestItem, detail: Option<PullRequestDetail>) -> Self {
        let (user_login, user_html_url) = item
            .user
            .map_or((None, None), |user| (Some(user.login), Some(user.html_url)));
        let detail = detail.as_ref();

        Self {
            number: item.number,
            title: item.title,
            user_login,
            user_html_url,
            state: item.state,
            merged: item.merged_at.is_some(),
            updated_at: item.updated_at,
            html_url: item.html_url,
            additions: detail.map(|d| d.additions),
            deletions: detail.map(|d| d.deletions),
            changed_files: detail.map(|d| d.changed_files),
            commits: detail.map(|d| d.commits),
            mergeable_state: detail.and_then(|d| d.mergeable_state.clone()),
            merged_at: detail.and_then(|d| d.merged_at),
            base_ref: detail.and_then(|d| Some(d.base.as_ref()?.name.clone())),
            head_ref: detail.and_then(|d| Some(d.head.as_ref()?.name.clone())),
        }
    }
}

/// One commit. The size fields come from the detail request.
#[derive(Debug, Serialize)]
pub struct CommitSummary {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub html_url: String,
    pub author_login: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub date: Timestamp,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub total_changes: Option<u64>,
    pub files_changed: Option<u64>,
}

impl CommitSummary {
    pub fn new(item: CommitItem, date: Timestamp, detail: Option<CommitDetail>) -> Self {
        let short_sha = item.sha.get(..7).unwrap_or(&item.sha).to_owned();
        let message = item.commit.message.lines().next().unwrap_or_default().to_owned();
        let (author_name, author_email) = item
            .commit
            .author
            .map_or((None, None), |sig| (sig.name, sig.email));
        let stats = detail.as_ref().and_then(|d| d.stats.as_ref());

        Self {
            short_sha,
            message,
            html_url: item.html_url,
            author_login: item.author.map(|account| account.login),
            author_name,
            author_email,
            date,
            additions: stats.map(|s| s.additions),
            deletions: stats.map(|s| s.deletions),
            total_changes: stats.map(|s| s.total),
            files_changed: detail.as_ref().map(|d| d.files.len() as u64),
            sha: item.sha,
        }
    }
}

/// Start of the reporting window: `now` truncated to whole seconds, minus `hours`.
pub fn cutoff(now: Timestamp, hours: u32) -> Result<Timestamp, jiff::Error> {
    Timestamp::from_second(now.as_second())?.checked_sub(SignedDuration::from_hours(i64::from(hours)))
}
