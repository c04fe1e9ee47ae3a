//! Shapes of the GitHub REST API responses we read. Only the fields we use
//! are declared; serde ignores the rest.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// `GET /repos/{owner}/{name}`
#[derive(Debug, Deserialize)]
pub struct Repository {
    pub default_branch: String,
}

/// A GitHub account as embedded in PRs and commits
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

/// One entry of `GET /repos/{owner}/{name}/pulls`
#[derive(Debug, Deserialize)]
pub struct PullRequestItem {
    pub number: u64,
    pub title: String,
    pub user: Option<Account>,
    pub state: PullRequestState,
    pub updated_at: Timestamp,
    pub html_url: String,
    pub merged_at: Option<Timestamp>,
}

/// `GET /repos/{owner}/{name}/pulls/{number}`
#[derive(Debug, Deserialize)]
pub struct PullRequestDetail {
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub commits: u64,
    pub mergeable_state: Option<String>,
    pub merged_at: Option<Timestamp>,
    pub base: Option<BranchRef>,
    pub head: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
pub struct Signature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct GitCommit {
    pub message: String,
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

/// One entry of `GET /repos/{owner}/{name}/commits`
#[derive(Debug, Deserialize)]
pub struct CommitItem {
    pub sha: String,
    pub html_url: String,
    /// The linked GitHub account, absent when the author email matches none
    pub author: Option<Account>,
    pub commit: GitCommit,
}

impl CommitItem {
    /// Author date, falling back to the committer date
    pub fn timestamp(&self) -> Option<Timestamp> {
        let date = |sig: &Option<Signature>| sig.as_ref().and_then(|sig| sig.date);
        date(&self.commit.author).or_else(|| date(&self.commit.committer))
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// `GET /repos/{owner}/{name}/commits/{sha}`
#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    pub stats: Option<CommitStats>,
    #[serde(default)]
    pub files: Vec<serde::de::IgnoredAny>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn commit(author_date: Option<&str>, committer_date: Option<&str>) -> CommitItem {
        serde_json::from_value(json!({
            "sha": "0123456789abcdef",
            "html_url": "https://github.com/o/r/commit/0123456789abcdef",
            "author": null,
            "commit": {
                "message": "Fix things",
                "author": {"name": "A", "email": "a@example.com", "date": author_date},
                "committer": {"name": "C", "email": "c@example.com", "date": committer_date},
            }
        }))
        .expect("fixture should deserialize")
    }

    #[test]
    fn commit_timestamp_prefers_author_date() {
        let item = commit(Some("2024-06-01T10:00:00Z"), Some("2024-06-01T11:00:00Z"));
        assert_eq!(item.timestamp(), Some("2024-06-01T10:00:00Z".parse().unwrap()));
    }

    #[test]
    fn commit_timestamp_falls_back_to_committer() {
        let item = commit(None, Some("2024-06-01T11:00:00Z"));
        assert_eq!(item.timestamp(), Some("2024-06-01T11:00:00Z".parse().unwrap()));
    }

    #[test]
    fn commit_without_any_date_has_no_timestamp() {
        assert_eq!(commit(None, None).timestamp(), None);
    }

    #[test]
    fn pull_request_with_deleted_user() {
        let item: PullRequestItem = serde_json::from_value(json!({
            "number": 7,
            "title": "Ghost PR",
            "user": null,
            "state": "closed",
            "updated_at": "2024-06-01T10:00:00Z",
            "html_url": "https://github.com/o/r/pull/7",
            "merged_at": null,
        }))
        .expect("fixture should deserialize");

        assert!(item.user.is_none());
        assert_eq!(item.state, PullRequestState::Closed);
    }

    #[test]
    fn commit_detail_counts_files() {
        let detail: CommitDetail = serde_json::from_value(json!({
            "stats": {"additions": 3, "deletions": 1, "total": 4},
            "files": [{"filename": "a.rs"}, {"filename": "b.rs"}],
        }))
        .expect("fixture should deserialize");

        assert_eq!(detail.files.len(), 2);
        assert_eq!(detail.stats.map(|s| s.total), Some(4));
    }
}
