//! One command in, one outcome out.
//!
//! Order: parse the team from the body, authorize the requester, verify the
//! target team and maintainership, resolve the runner group (skipped for
//! `group-create`), execute the action, report. A parse failure or a requester
//! who is not in the authorized team never touches the issue; a failed
//! member listing is reported like any later remote error.

use ghm_issues::issue_comment::{workflow_run_url, RUNNER_GROUP_NOT_FOUND_MESSAGE};
use ghm_issues::{
    normalize_issue_body, parse_team_slug, runner_group_name, CommandParseError,
    RunnerGroupAction, SecretSet, SecretSink,
};
use tracing::{error, info};

use crate::authorization::{verify_requester_authorized, verify_target_team};
use crate::error::ManagerError;
use crate::feedback::{FeedbackDelivery, FeedbackReporter};
use crate::platform::{IssueTarget, RunnerGroupPlatform};
use crate::reconciliation::{ActionOutcome, ReconciliationExecutor, RunnerGroupRef};
use crate::runner_group_resolver::resolve_runner_group_id;

pub const DEFAULT_SERVER_URL: &str = "https://github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable request assembled from the workflow inputs.
pub struct RunnerGroupCommand {
    pub action: RunnerGroupAction,
    pub actor: String,
    pub org: String,
    pub repo: String,
    pub issue_number: u64,
    pub workflow_run_id: u64,
    pub body: String,
    pub authorized_team_slug: String,
}

impl RunnerGroupCommand {
    pub fn issue_target(&self) -> IssueTarget {
        IssueTarget {
            owner: self.org.clone(),
            repo: self.repo.clone(),
            number: self.issue_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Succeeded,
    /// Failed after authorization; the requester was told on the issue.
    Failed,
    /// Unparseable body or unauthorized requester; nothing was posted.
    Rejected,
}

#[derive(Debug)]
pub struct CommandReport {
    pub action: RunnerGroupAction,
    pub status: CommandStatus,
    pub outcome: Option<ActionOutcome>,
    pub error: Option<ManagerError>,
    pub feedback: Option<FeedbackDelivery>,
}

impl CommandReport {
    fn rejected(action: RunnerGroupAction, error: ManagerError) -> Self {
        Self {
            action,
            status: CommandStatus::Rejected,
            outcome: None,
            error: Some(error),
            feedback: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Succeeded
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

pub struct RunnerGroupManager<P> {
    platform: P,
    command: RunnerGroupCommand,
    server_url: String,
    secrets: SecretSet,
}

impl<P> RunnerGroupManager<P>
where
    P: RunnerGroupPlatform,
{
    pub fn new(platform: P, command: RunnerGroupCommand) -> Self {
        Self {
            platform,
            command,
            server_url: DEFAULT_SERVER_URL.to_string(),
            secrets: SecretSet::new(),
        }
    }

    /// Base URL used for the failure-log link and runner `config.sh` URLs.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_secret_sink(mut self, sink: Box<dyn SecretSink>) -> Self {
        self.secrets = SecretSet::with_sink(sink);
        self
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn secrets(&self) -> &SecretSet {
        &self.secrets
    }

    pub fn run(&mut self) -> CommandReport {
        let action = self.command.action;
        let body = normalize_issue_body(&self.command.body);

        let team_slug = match parse_team_slug(&body) {
            Ok(team_slug) => team_slug,
            Err(parse_error) => {
                if let CommandParseError::InvalidTeamSlug { slug } = &parse_error {
                    self.secrets.register(slug.clone());
                }
                error!(
                    error = %self.secrets.redact(&parse_error.to_string()),
                    "Failed to retrieve team"
                );
                return CommandReport::rejected(action, parse_error.into());
            }
        };
        self.secrets.register(team_slug.clone());
        let group_name = runner_group_name(&team_slug);
        self.secrets.register(group_name.clone());

        let result = match verify_requester_authorized(
            &self.platform,
            &self.command.org,
            &self.command.authorized_team_slug,
            &self.command.actor,
        ) {
            Ok(()) => {
                info!(
                    action = %action,
                    org = %self.command.org,
                    actor = %self.command.actor,
                    "Executing action"
                );
                execute_authorized(
                    &self.platform,
                    &self.command,
                    &body,
                    &team_slug,
                    &group_name,
                    &mut self.secrets,
                )
            }
            Err(remote_error @ ManagerError::Remote { .. }) => {
                error!(
                    error = %self.secrets.redact(&remote_error.to_string()),
                    "Unable to verify requester authorization"
                );
                Err(remote_error)
            }
            Err(auth_error) => {
                error!(
                    error = %self.secrets.redact(&auth_error.to_string()),
                    "Authorization failed, user is not authorized to perform this action"
                );
                return CommandReport::rejected(action, auth_error);
            }
        };

        let issue = self.command.issue_target();
        let run_url = workflow_run_url(
            &self.server_url,
            &self.command.org,
            &self.command.repo,
            self.command.workflow_run_id,
        );
        let reporter = FeedbackReporter::new(&self.platform, &issue, &run_url, &self.secrets);
        match result {
            Ok(outcome) => {
                let message = outcome.render_message(&self.server_url, &self.command.org);
                let delivery = reporter.succeed(&message);
                CommandReport {
                    action,
                    status: CommandStatus::Succeeded,
                    outcome: Some(outcome),
                    error: None,
                    feedback: Some(delivery),
                }
            }
            Err(failure) => {
                let delivery = reporter.fail(&failure.to_string());
                CommandReport {
                    action,
                    status: CommandStatus::Failed,
                    outcome: None,
                    error: Some(failure),
                    feedback: Some(delivery),
                }
            }
        }
    }
}

fn execute_authorized<P>(
    platform: &P,
    command: &RunnerGroupCommand,
    body: &str,
    team_slug: &str,
    group_name: &str,
    secrets: &mut SecretSet,
) -> Result<ActionOutcome, ManagerError>
where
    P: RunnerGroupPlatform + ?Sized,
{
    let team = verify_target_team(platform, &command.org, team_slug, &command.actor)?;

    let group = if command.action.requires_existing_group() {
        let group_id = resolve_runner_group_id(platform, &command.org, group_name)
            .map_err(|error| ManagerError::remote("Unable to retrieve runner groups", error))?
            .ok_or_else(|| ManagerError::not_found(RUNNER_GROUP_NOT_FOUND_MESSAGE))?;
        RunnerGroupRef::resolved(group_name, group_id)
    } else {
        RunnerGroupRef::unresolved(group_name)
    };

    ReconciliationExecutor::new(platform, &command.org, &team).execute(
        command.action,
        &group,
        body,
        secrets,
    )
}
