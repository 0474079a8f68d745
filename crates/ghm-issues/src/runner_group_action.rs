use std::fmt;
use std::str::FromStr;

/// Prefix applied to a team slug to build its runner-group name.
pub const RUNNER_GROUP_PREFIX: &str = "ghm-";

const ACTION_NAMES: [&str; 8] = [
    "group-create",
    "group-delete",
    "group-list",
    "repos-add",
    "repos-remove",
    "repos-set",
    "token-register",
    "token-remove",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `RunnerGroupAction` values.
pub enum RunnerGroupAction {
    GroupCreate,
    GroupDelete,
    GroupList,
    ReposAdd,
    ReposRemove,
    ReposSet,
    TokenRegister,
    TokenRemove,
}

impl RunnerGroupAction {
    pub const ALL: [RunnerGroupAction; 8] = [
        RunnerGroupAction::GroupCreate,
        RunnerGroupAction::GroupDelete,
        RunnerGroupAction::GroupList,
        RunnerGroupAction::ReposAdd,
        RunnerGroupAction::ReposRemove,
        RunnerGroupAction::ReposSet,
        RunnerGroupAction::TokenRegister,
        RunnerGroupAction::TokenRemove,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunnerGroupAction::GroupCreate => ACTION_NAMES[0],
            RunnerGroupAction::GroupDelete => ACTION_NAMES[1],
            RunnerGroupAction::GroupList => ACTION_NAMES[2],
            RunnerGroupAction::ReposAdd => ACTION_NAMES[3],
            RunnerGroupAction::ReposRemove => ACTION_NAMES[4],
            RunnerGroupAction::ReposSet => ACTION_NAMES[5],
            RunnerGroupAction::TokenRegister => ACTION_NAMES[6],
            RunnerGroupAction::TokenRemove => ACTION_NAMES[7],
        }
    }

    /// Actions whose issue body carries a `Repos` section below the team.
    pub fn requires_repo_list(self) -> bool {
        matches!(
            self,
            RunnerGroupAction::ReposAdd | RunnerGroupAction::ReposRemove | RunnerGroupAction::ReposSet
        )
    }

    /// Every action except group creation operates on a group that must
    /// already exist remotely.
    pub fn requires_existing_group(self) -> bool {
        !matches!(self, RunnerGroupAction::GroupCreate)
    }
}

impl fmt::Display for RunnerGroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerGroupAction {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim();
        RunnerGroupAction::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unsupported action '{normalized}', expected one of: {}",
                    ACTION_NAMES.join(", ")
                )
            })
    }
}

/// Runner-group names are a pure function of the team slug.
pub fn runner_group_name(team_slug: &str) -> String {
    format!("{RUNNER_GROUP_PREFIX}{team_slug}")
}
