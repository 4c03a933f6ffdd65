//! Repository issue listing via the `gh` CLI.
//!
//! Authentication, pagination, and data retrieval are all delegated to the
//! external tool; this module only decides whether the project has a usable
//! remote, shells out, and reshapes the JSON output.
//!
//! Workflow:
//! 1. Read the `origin` remote URL with `git remote get-url origin`.
//! 2. If there is no remote, or it does not point at GitHub, fail with the
//!    distinct "no remote configured" condition before any fetch.
//! 3. Fetch open and closed issues separately with `gh issue list --json`.
//! 4. Return open-only, closed-only, and combined (open first) views.

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IssuesConfig;

/// JSON fields requested from `gh issue list`.
const GH_JSON_FIELDS: &str = "number,title,state,author,createdAt,labels,url,body";

/// Issue listing error.
///
/// `NoRemote` is user-visible configuration state, not a fetch failure, and
/// is never collapsed into an empty issue list.
#[derive(Debug)]
pub enum IssueError {
    NoRemote,
    Command(String),
    Parse(String),
}

impl std::fmt::Display for IssueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueError::NoRemote => {
                write!(f, "no remote configured: repository has no GitHub origin")
            }
            IssueError::Command(e) => write!(f, "issue listing failed: {}", e),
            IssueError::Parse(e) => write!(f, "could not parse issue data: {}", e),
        }
    }
}

impl std::error::Error for IssueError {}

/// A label attached to an issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// One repository issue as returned by the lister.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Issue {
    pub number: i64,
    pub title: String,
    pub state: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub labels: Vec<Label>,
    pub url: String,
    pub body: String,
}

/// Open and closed issues for one repository.
#[derive(Debug, Clone, Serialize)]
pub struct IssueReport {
    pub open: Vec<Issue>,
    pub closed: Vec<Issue>,
}

impl IssueReport {
    /// Combined view: open issues first, then closed.
    pub fn combined(&self) -> Vec<Issue> {
        self.open
            .iter()
            .chain(self.closed.iter())
            .cloned()
            .collect()
    }
}

// Raw shapes of `gh issue list --json` output.

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: i64,
    title: String,
    state: String,
    author: GhAuthor,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    labels: Vec<Label>,
    url: String,
    #[serde(default)]
    body: String,
}

#[derive(Debug, Deserialize)]
struct GhAuthor {
    login: String,
}

/// Read the `origin` remote URL and require it to point at GitHub.
pub fn detect_remote(repo_dir: &Path) -> Result<String, IssueError> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| IssueError::Command(format!("failed to execute 'git': {}", e)))?;

    if !output.status.success() {
        return Err(IssueError::NoRemote);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() || !url.contains("github.com") {
        return Err(IssueError::NoRemote);
    }

    Ok(url)
}

/// Fetch open and closed issues for the configured repository.
pub fn fetch_issues(config: &IssuesConfig) -> Result<IssueReport, IssueError> {
    detect_remote(&config.repo_dir)?;

    let open = gh_issue_list(&config.repo_dir, "open", config.open_limit)?;
    let closed = gh_issue_list(&config.repo_dir, "closed", config.closed_limit)?;

    Ok(IssueReport { open, closed })
}

fn gh_issue_list(repo_dir: &Path, state: &str, limit: usize) -> Result<Vec<Issue>, IssueError> {
    let output = Command::new("gh")
        .args(["issue", "list", "--state", state])
        .args(["--limit", &limit.to_string()])
        .args(["--json", GH_JSON_FIELDS])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| IssueError::Command(format!("failed to execute 'gh': {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IssueError::Command(format!(
            "gh issue list --state {} failed: {}",
            state,
            stderr.trim()
        )));
    }

    parse_issues(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `gh issue list --json` output into typed issues.
pub fn parse_issues(json: &str) -> Result<Vec<Issue>, IssueError> {
    let raw: Vec<GhIssue> =
        serde_json::from_str(json).map_err(|e| IssueError::Parse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|i| Issue {
            number: i.number,
            title: i.title,
            state: i.state,
            author: i.author.login,
            created_at: i.created_at,
            labels: i.labels,
            url: i.url,
            body: i.body,
        })
        .collect())
}
