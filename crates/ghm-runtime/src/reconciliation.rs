//! Action dispatch against the runner-group API.
//!
//! Each action is one remote operation, except the `repos-*` actions which
//! first verify every requested repository (assigned to the team, exists on
//! the platform) and only then mutate the group. `repos-add` and
//! `repos-remove` issue one call per repository with no rollback; a failure
//! part way leaves the earlier repositories mutated. `repos-set` replaces
//! the whole set in a single call.

use std::collections::BTreeMap;

use ghm_issues::issue_comment::{
    render_group_list_message, render_runner_token_message, RunnerTokenKind,
    GROUP_CREATED_MESSAGE, GROUP_DELETED_MESSAGE, REPOS_ADDED_MESSAGE, REPOS_REMOVED_MESSAGE,
    REPOS_REPLACED_MESSAGE, RUNNER_GROUP_NOT_FOUND_MESSAGE,
};
use ghm_issues::{parse_repo_list, RunnerGroupAction, SecretSet};
use tracing::info;

use crate::authorization::VerifiedTeam;
use crate::error::ManagerError;
use crate::pagination::{collect_pages, find_in_pages};
use crate::platform::{CreateRunnerGroupRequest, RunnerGroup, RunnerGroupPlatform, RunnerToken};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Runner group addressed by the command; `id` is only ever read remotely.
pub struct RunnerGroupRef {
    pub name: String,
    pub id: Option<u64>,
}

impl RunnerGroupRef {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn resolved(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id: Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `ActionOutcome` values.
pub enum ActionOutcome {
    GroupCreated { group: RunnerGroup },
    GroupDeleted,
    GroupListed { repos: Vec<String>, runners: Vec<String> },
    ReposAdded { repos: Vec<String> },
    ReposRemoved { repos: Vec<String> },
    ReposReplaced { repos: Vec<String> },
    RegistrationToken(RunnerToken),
    RemovalToken(RunnerToken),
}

impl ActionOutcome {
    /// Success comment for this outcome, before redaction.
    pub fn render_message(&self, server_url: &str, org: &str) -> String {
        match self {
            ActionOutcome::GroupCreated { .. } => GROUP_CREATED_MESSAGE.to_string(),
            ActionOutcome::GroupDeleted => GROUP_DELETED_MESSAGE.to_string(),
            ActionOutcome::GroupListed { repos, runners } => {
                render_group_list_message(repos, runners)
            }
            ActionOutcome::ReposAdded { .. } => REPOS_ADDED_MESSAGE.to_string(),
            ActionOutcome::ReposRemoved { .. } => REPOS_REMOVED_MESSAGE.to_string(),
            ActionOutcome::ReposReplaced { .. } => REPOS_REPLACED_MESSAGE.to_string(),
            ActionOutcome::RegistrationToken(token) => render_runner_token_message(
                RunnerTokenKind::Registration,
                &token.token,
                &token.expires_at,
                server_url,
                org,
            ),
            ActionOutcome::RemovalToken(token) => render_runner_token_message(
                RunnerTokenKind::Removal,
                &token.token,
                &token.expires_at,
                server_url,
                org,
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepoMutation {
    Add,
    Remove,
}

pub struct ReconciliationExecutor<'a, P: ?Sized> {
    platform: &'a P,
    org: &'a str,
    team: &'a VerifiedTeam,
}

impl<'a, P> ReconciliationExecutor<'a, P>
where
    P: RunnerGroupPlatform + ?Sized,
{
    pub fn new(platform: &'a P, org: &'a str, team: &'a VerifiedTeam) -> Self {
        Self {
            platform,
            org,
            team,
        }
    }

    /// Runs `action` against `group`. Repo names parsed from `body` are
    /// registered in `secrets` before any of them is looked up.
    pub fn execute(
        &self,
        action: RunnerGroupAction,
        group: &RunnerGroupRef,
        body: &str,
        secrets: &mut SecretSet,
    ) -> Result<ActionOutcome, ManagerError> {
        let requested = if action.requires_repo_list() {
            parse_requested_repos(body, secrets)?
        } else {
            Vec::new()
        };
        match action {
            RunnerGroupAction::GroupCreate => self.create_group(&group.name),
            RunnerGroupAction::GroupDelete => self.delete_group(require_group_id(group)?),
            RunnerGroupAction::GroupList => self.list_group(require_group_id(group)?),
            RunnerGroupAction::ReposAdd => {
                self.mutate_repos(require_group_id(group)?, &requested, RepoMutation::Add)
            }
            RunnerGroupAction::ReposRemove => {
                self.mutate_repos(require_group_id(group)?, &requested, RepoMutation::Remove)
            }
            RunnerGroupAction::ReposSet => self.set_repos(require_group_id(group)?, requested),
            RunnerGroupAction::TokenRegister => {
                require_group_id(group)?;
                info!("Creating registration token");
                let token = self
                    .platform
                    .create_registration_token(self.org)
                    .map_err(|error| {
                        ManagerError::remote("Unable to create registration token", error)
                    })?;
                info!("Created registration token");
                Ok(ActionOutcome::RegistrationToken(token))
            }
            RunnerGroupAction::TokenRemove => {
                require_group_id(group)?;
                info!("Creating removal token");
                let token = self
                    .platform
                    .create_removal_token(self.org)
                    .map_err(|error| ManagerError::remote("Unable to create removal token", error))?;
                info!("Created removal token");
                Ok(ActionOutcome::RemovalToken(token))
            }
        }
    }

    fn create_group(&self, name: &str) -> Result<ActionOutcome, ManagerError> {
        info!("Creating runner group");
        let request = CreateRunnerGroupRequest::selected_private(name);
        let group = self
            .platform
            .create_runner_group(self.org, &request)
            .map_err(|error| ManagerError::remote("Unable to create group", error))?;
        info!(group = %group.name, id = group.id, "Created group");
        Ok(ActionOutcome::GroupCreated { group })
    }

    fn delete_group(&self, group_id: u64) -> Result<ActionOutcome, ManagerError> {
        info!("Deleting runner group");
        self.platform
            .delete_runner_group(self.org, group_id)
            .map_err(|error| ManagerError::remote("Unable to delete group", error))?;
        info!("Deleted group");
        Ok(ActionOutcome::GroupDeleted)
    }

    fn list_group(&self, group_id: u64) -> Result<ActionOutcome, ManagerError> {
        info!("Retrieving repos for runner group");
        let repos = collect_pages(|page| {
            self.platform
                .list_runner_group_repos(self.org, group_id, page)
        })
        .map_err(|error| ManagerError::remote("Unable to retrieve repos", error))?
        .into_iter()
        .map(|repo| repo.name)
        .collect();

        info!("Retrieving runners for group");
        let runners = collect_pages(|page| {
            self.platform
                .list_runner_group_runners(self.org, group_id, page)
        })
        .map_err(|error| ManagerError::remote("Unable to retrieve runners", error))?
        .into_iter()
        .map(|runner| runner.name)
        .collect();

        Ok(ActionOutcome::GroupListed { repos, runners })
    }

    fn mutate_repos(
        &self,
        group_id: u64,
        requested: &[String],
        mutation: RepoMutation,
    ) -> Result<ActionOutcome, ManagerError> {
        let mut verified = BTreeMap::new();
        for name in requested {
            let id = self.verify_repository(name)?;
            verified.insert(name.clone(), id);
        }

        for (name, id) in &verified {
            match mutation {
                RepoMutation::Add => {
                    info!(repo = %name, "Adding repo to group");
                    self.platform
                        .add_runner_group_repo(self.org, group_id, *id)
                        .map_err(|error| {
                            ManagerError::remote(format!("Unable to add repo {name} to group"), error)
                        })?;
                }
                RepoMutation::Remove => {
                    info!(repo = %name, "Removing repo from group");
                    self.platform
                        .remove_runner_group_repo(self.org, group_id, *id)
                        .map_err(|error| {
                            ManagerError::remote(
                                format!("Unable to remove repo {name} from group"),
                                error,
                            )
                        })?;
                }
            }
        }

        let repos = verified.into_keys().collect();
        Ok(match mutation {
            RepoMutation::Add => ActionOutcome::ReposAdded { repos },
            RepoMutation::Remove => ActionOutcome::ReposRemoved { repos },
        })
    }

    fn set_repos(
        &self,
        group_id: u64,
        requested: Vec<String>,
    ) -> Result<ActionOutcome, ManagerError> {
        let mut repo_ids = Vec::with_capacity(requested.len());
        for name in &requested {
            let id = self.verify_repository(name)?;
            if !repo_ids.contains(&id) {
                repo_ids.push(id);
            }
        }

        info!(
            repos = %requested.join(", "),
            "Replacing existing repos for group with new repo set"
        );
        self.platform
            .set_runner_group_repos(self.org, group_id, &repo_ids)
            .map_err(|error| ManagerError::remote("Unable to replace repos for group", error))?;
        Ok(ActionOutcome::ReposReplaced { repos: requested })
    }

    /// Checks team assignment, then resolves the platform-wide repository id.
    fn verify_repository(&self, name: &str) -> Result<u64, ManagerError> {
        self.verify_repo_assigned_to_team(name)?;
        self.resolve_repository_id(name)
    }

    fn verify_repo_assigned_to_team(&self, name: &str) -> Result<(), ManagerError> {
        info!(repo = %name, "Verifying repo is assigned to team");
        let assigned = find_in_pages(
            |page| {
                self.platform
                    .list_team_repos(self.org, &self.team.slug, page)
            },
            |repo| repo.name == name,
        )
        .map_err(|error| ManagerError::remote("Unable to retrieve repos", error))?;
        if assigned.is_none() {
            return Err(ManagerError::authorization(format!(
                "Repo {name} is not assigned to team"
            )));
        }
        info!(repo = %name, "Repo is assigned to team");
        Ok(())
    }

    fn resolve_repository_id(&self, name: &str) -> Result<u64, ManagerError> {
        info!(repo = %name, "Verifying repo exists");
        match self.platform.get_repository(self.org, name) {
            Ok(repo) => Ok(repo.id),
            Err(error) if error.is_not_found() => Err(ManagerError::not_found(format!(
                "Repo {name} does not exist"
            ))),
            Err(error) => Err(ManagerError::remote("Unable to get repository", error)),
        }
    }
}

fn require_group_id(group: &RunnerGroupRef) -> Result<u64, ManagerError> {
    group
        .id
        .ok_or_else(|| ManagerError::not_found(RUNNER_GROUP_NOT_FOUND_MESSAGE))
}

fn parse_requested_repos(body: &str, secrets: &mut SecretSet) -> Result<Vec<String>, ManagerError> {
    let repos = parse_repo_list(body)?;
    for repo in &repos {
        secrets.register(repo.clone());
    }
    Ok(repos)
}
