//! GitHub side of gitbot: the REST client, remote precondition checks, page
//! aggregation, and the dispatcher that turns validated requests into results.

pub mod action_dispatcher;
pub mod github_api;
pub mod github_api_client;
mod github_transport_helpers;
pub mod pagination;
pub mod preconditions;
pub mod result_render;

#[cfg(test)]
mod test_support;

pub use action_dispatcher::{ActionDispatcher, ActionFailure, ResultSet, DEFAULT_EXCLUDED_TEAMS};
pub use github_api::{GithubApi, GithubApiError, RepoTarget};
pub use github_api_client::{GithubApiClient, DEFAULT_GITHUB_API_BASE};
pub use preconditions::{CheckFailure, PreconditionChecker};
