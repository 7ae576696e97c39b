//! GitHub REST surface consumed by the dispatcher, expressed as a trait so the
//! precondition and dispatch logic can run against a scripted fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Organization/repository pair every command is executed against.
pub struct RepoTarget {
    pub organization: String,
    pub repository: String,
}

impl RepoTarget {
    pub fn new(organization: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            repository: repository.into(),
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates failures returned by [`GithubApi`] implementations.
pub enum GithubApiError {
    #[error("github api {operation} returned 404 not found")]
    NotFound { operation: &'static str },
    #[error("github api {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("github api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode github {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid github authorization header")]
    InvalidToken,
    #[error("failed to create github api client: {0}")]
    Build(#[source] reqwest::Error),
}

impl GithubApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn first() -> Self {
        Self::new(1)
    }

    pub fn new(page: u32) -> Self {
        Self {
            page,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page of a list endpoint plus the cursor the remote reported.
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubAccount {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubRepository {
    pub name: String,
    pub owner: GithubAccount,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GithubIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub body: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub assignees: Vec<GithubAccount>,
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl GithubIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubLabel {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubTeam {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubTeamMembership {
    pub state: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl GithubTeamMembership {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }

    pub fn is_pending(&self) -> bool {
        self.state == "pending"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Query filters for the repository issue list endpoint.
pub struct IssueListParams {
    pub state: String,
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub labels: Vec<String>,
}

#[async_trait]
/// Trait contract for the GitHub endpoints the command pipeline needs.
pub trait GithubApi: Send + Sync {
    async fn list_org_repositories(
        &self,
        organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubRepository>, GithubApiError>;

    async fn get_user(&self, login: &str) -> Result<GithubUser, GithubApiError>;

    async fn get_issue(
        &self,
        owner: &str,
        repository: &str,
        number: u64,
    ) -> Result<GithubIssue, GithubApiError>;

    async fn list_repository_issues(
        &self,
        owner: &str,
        repository: &str,
        params: &IssueListParams,
        page: PageRequest,
    ) -> Result<Page<GithubIssue>, GithubApiError>;

    async fn list_repository_labels(
        &self,
        owner: &str,
        repository: &str,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError>;

    async fn list_issue_labels(
        &self,
        owner: &str,
        repository: &str,
        number: u64,
        page: PageRequest,
    ) -> Result<Page<GithubLabel>, GithubApiError>;

    async fn list_org_teams(
        &self,
        organization: &str,
        page: PageRequest,
    ) -> Result<Page<GithubTeam>, GithubApiError>;

    async fn get_team(&self, organization: &str, slug: &str)
        -> Result<GithubTeam, GithubApiError>;

    async fn is_org_member(&self, organization: &str, login: &str)
        -> Result<bool, GithubApiError>;

    async fn set_org_membership(
        &self,
        organization: &str,
        login: &str,
    ) -> Result<(), GithubApiError>;

    /// Returns `None` when the user has no membership record for the team.
    async fn get_team_membership(
        &self,
        organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<Option<GithubTeamMembership>, GithubApiError>;

    async fn add_team_membership(
        &self,
        organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<GithubTeamMembership, GithubApiError>;
}
