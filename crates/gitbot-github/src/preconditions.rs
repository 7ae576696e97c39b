//! Remote existence and membership checks run before an action executes.

use crate::github_api::{GithubApi, GithubApiError, RepoTarget};
use crate::pagination::find_in_pages;

pub const INTERNAL_ERROR_REASON: &str = "Internal Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    NotFound { reason: String, detail: String },
    Internal { detail: String },
}

impl CheckFailure {
    /// The short, user-facing reason. Internal details are never included.
    pub fn reason(&self) -> &str {
        match self {
            Self::NotFound { reason, .. } => reason,
            Self::Internal { .. } => INTERNAL_ERROR_REASON,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::NotFound { detail, .. } | Self::Internal { detail } => detail,
        }
    }

    fn not_found(reason: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
            detail: detail.into(),
        }
    }

    fn classify(error: GithubApiError, not_found_reason: &str) -> Self {
        let failure = if error.is_not_found() {
            Self::not_found(not_found_reason, error.to_string())
        } else {
            Self::Internal {
                detail: error.to_string(),
            }
        };
        tracing::warn!(
            reason = failure.reason(),
            detail = failure.detail(),
            "github precondition check failed"
        );
        failure
    }
}

pub type CheckOutcome = Result<(), CheckFailure>;

/// Borrowing view over a [`GithubApi`] that answers precondition questions.
pub struct PreconditionChecker<'a> {
    api: &'a dyn GithubApi,
}

impl<'a> PreconditionChecker<'a> {
    pub fn new(api: &'a dyn GithubApi) -> Self {
        Self { api }
    }

    /// Pages through the organization's repositories until name and owner match.
    pub async fn repository_exists(&self, target: &RepoTarget) -> CheckOutcome {
        let reason = format!(
            "Unknown Organization `{}` and/or Repository `{}`",
            target.organization, target.repository
        );
        let found = find_in_pages(
            |page| self.api.list_org_repositories(&target.organization, page),
            |repository| {
                repository.name == target.repository
                    && repository.owner.login == target.organization
            },
        )
        .await
        .map_err(|error| CheckFailure::classify(error, &reason))?;
        match found {
            Some(_) => Ok(()),
            None => {
                tracing::info!(
                    organization = target.organization.as_str(),
                    repository = target.repository.as_str(),
                    "repository not found in organization listing"
                );
                Err(CheckFailure::not_found(
                    reason,
                    "repository missing from organization listing",
                ))
            }
        }
    }

    pub async fn user_exists(&self, login: &str) -> CheckOutcome {
        self.api
            .get_user(login)
            .await
            .map(|_| ())
            .map_err(|error| CheckFailure::classify(error, "Unknown User"))
    }

    pub async fn issue_exists(&self, target: &RepoTarget, number: u64) -> CheckOutcome {
        self.api
            .get_issue(&target.organization, &target.repository, number)
            .await
            .map(|_| ())
            .map_err(|error| CheckFailure::classify(error, "Unknown Issue"))
    }

    pub async fn team_exists(&self, organization: &str, slug: &str) -> CheckOutcome {
        self.api
            .get_team(organization, slug)
            .await
            .map(|_| ())
            .map_err(|error| CheckFailure::classify(error, "Unknown Team"))
    }

    pub async fn is_org_member(
        &self,
        organization: &str,
        login: &str,
    ) -> Result<bool, CheckFailure> {
        self.api
            .is_org_member(organization, login)
            .await
            .map_err(|error| CheckFailure::classify(error, "Unknown Organization"))
    }

    /// True only for an `active` membership; a pending invitation is logged and reported as false.
    pub async fn is_active_team_member(
        &self,
        organization: &str,
        slug: &str,
        login: &str,
    ) -> Result<bool, CheckFailure> {
        let membership = self
            .api
            .get_team_membership(organization, slug, login)
            .await
            .map_err(|error| CheckFailure::classify(error, "Unknown Team"))?;
        match membership {
            Some(membership) if membership.is_active() => Ok(true),
            Some(membership) => {
                if membership.is_pending() {
                    tracing::info!(
                        team = slug,
                        user = login,
                        "team membership invitation is pending"
                    );
                }
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
