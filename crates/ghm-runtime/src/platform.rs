//! Remote collaborator surface consumed by the pipeline.
//!
//! [`RunnerGroupPlatform`] groups the team, runner-group, repository and
//! issue-comment capabilities the pipeline needs. [`crate::GithubApiClient`]
//! implements it against the GitHub REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Error)]
/// Enumerates supported `PlatformError` values.
pub enum PlatformError {
    #[error("invalid github client configuration: {0}")]
    Configuration(String),
    #[error("github api {operation} request failed: {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("github api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode github {operation}: {source}")]
    Decode {
        operation: String,
        #[source]
        source: reqwest::Error,
    },
}

impl PlatformError {
    pub fn status(&self) -> Option<u16> {
        match self {
            PlatformError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// One page of a listing plus the page number the remote advertised next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubTeam {
    pub slug: String,
    #[serde(default)]
    pub privacy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubTeamMembership {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubRepository {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerGroup {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelfHostedRunner {
    pub id: u64,
    pub name: String,
}

/// Short-lived runner registration or removal credential.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for RunnerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueCommentCreated {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRunnerGroupRequest {
    pub name: String,
    pub visibility: String,
    pub allows_public_repositories: bool,
}

impl CreateRunnerGroupRequest {
    /// Private group restricted to explicitly selected repositories.
    pub fn selected_private(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: "selected".to_string(),
            allows_public_repositories: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `IssueTarget` identifying the issue that carried the request.
pub struct IssueTarget {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Trait contract for the remote platform behaviour the pipeline consumes.
pub trait RunnerGroupPlatform {
    // teams
    fn list_team_members(&self, org: &str, team_slug: &str, page: u32)
        -> PlatformResult<Page<GithubUser>>;
    fn get_team(&self, org: &str, team_slug: &str) -> PlatformResult<GithubTeam>;
    fn get_team_membership(
        &self,
        org: &str,
        team_slug: &str,
        username: &str,
    ) -> PlatformResult<GithubTeamMembership>;
    fn list_team_repos(
        &self,
        org: &str,
        team_slug: &str,
        page: u32,
    ) -> PlatformResult<Page<GithubRepository>>;

    // repositories
    fn get_repository(&self, owner: &str, name: &str) -> PlatformResult<GithubRepository>;

    // runner groups
    fn list_runner_groups(&self, org: &str, page: u32) -> PlatformResult<Page<RunnerGroup>>;
    fn create_runner_group(
        &self,
        org: &str,
        request: &CreateRunnerGroupRequest,
    ) -> PlatformResult<RunnerGroup>;
    fn delete_runner_group(&self, org: &str, group_id: u64) -> PlatformResult<()>;
    fn list_runner_group_repos(
        &self,
        org: &str,
        group_id: u64,
        page: u32,
    ) -> PlatformResult<Page<GithubRepository>>;
    fn list_runner_group_runners(
        &self,
        org: &str,
        group_id: u64,
        page: u32,
    ) -> PlatformResult<Page<SelfHostedRunner>>;
    fn add_runner_group_repo(&self, org: &str, group_id: u64, repo_id: u64)
        -> PlatformResult<()>;
    fn remove_runner_group_repo(
        &self,
        org: &str,
        group_id: u64,
        repo_id: u64,
    ) -> PlatformResult<()>;
    fn set_runner_group_repos(
        &self,
        org: &str,
        group_id: u64,
        repo_ids: &[u64],
    ) -> PlatformResult<()>;
    fn create_registration_token(&self, org: &str) -> PlatformResult<RunnerToken>;
    fn create_removal_token(&self, org: &str) -> PlatformResult<RunnerToken>;

    // issues
    fn create_issue_comment(
        &self,
        issue: &IssueTarget,
        body: &str,
    ) -> PlatformResult<IssueCommentCreated>;
    fn close_issue(&self, issue: &IssueTarget) -> PlatformResult<()>;
}
