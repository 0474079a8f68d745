//! Runner-group reconciliation runtime.
//!
//! Chains the authorization checks, runner-group resolution, the action
//! dispatch against the GitHub runner-group API, and the redacted issue
//! feedback into one blocking pipeline driven by [`RunnerGroupManager`].

pub mod authorization;
pub mod error;
pub mod feedback;
pub mod github_api_client;
pub mod manager_runtime;
pub mod pagination;
pub mod platform;
pub mod reconciliation;
pub mod runner_group_resolver;

pub use authorization::VerifiedTeam;
pub use error::ManagerError;
pub use feedback::{FeedbackDelivery, FeedbackReporter};
pub use github_api_client::GithubApiClient;
pub use manager_runtime::{CommandReport, CommandStatus, RunnerGroupCommand, RunnerGroupManager};
pub use platform::{
    CreateRunnerGroupRequest, GithubRepository, GithubTeam, GithubTeamMembership, GithubUser,
    IssueCommentCreated, IssueTarget, Page, PlatformError, PlatformResult, RunnerGroup,
    RunnerGroupPlatform, RunnerToken, SelfHostedRunner,
};
pub use reconciliation::{ActionOutcome, ReconciliationExecutor, RunnerGroupRef};
