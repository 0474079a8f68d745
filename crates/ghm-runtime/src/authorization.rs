//! Requester, team and maintainership checks.
//!
//! The checks run in a fixed order and each one short-circuits the pipeline:
//! requester authorization first, then team existence and privacy, then the
//! requester's maintainer role on the target team.

use ghm_issues::issue_comment::{
    MAINTAINER_NOT_VERIFIED_MESSAGE, TEAM_NOT_PRIVATE_MESSAGE, TEAM_NOT_VERIFIED_MESSAGE,
};
use tracing::{info, warn};

use crate::error::ManagerError;
use crate::pagination::find_in_pages;
use crate::platform::RunnerGroupPlatform;

pub const SECRET_TEAM_PRIVACY: &str = "secret";
pub const MAINTAINER_ROLE: &str = "maintainer";
pub const REQUESTER_NOT_AUTHORIZED_MESSAGE: &str =
    "Authorization failed, user is not authorized to perform this action";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Target team after the existence, privacy and maintainership checks.
pub struct VerifiedTeam {
    pub slug: String,
}

/// `actor` must be listed in the members of `authorized_team`.
pub fn verify_requester_authorized<P>(
    platform: &P,
    org: &str,
    authorized_team: &str,
    actor: &str,
) -> Result<(), ManagerError>
where
    P: RunnerGroupPlatform + ?Sized,
{
    info!("Verifying user is authorized to perform this action");
    let member = find_in_pages(
        |page| platform.list_team_members(org, authorized_team, page),
        |member| member.login == actor,
    )
    .map_err(|error| ManagerError::remote("Unable to list team members", error))?;
    match member {
        Some(_) => Ok(()),
        None => Err(ManagerError::authorization(REQUESTER_NOT_AUTHORIZED_MESSAGE)),
    }
}

/// The target team must exist and be secret.
pub fn verify_team_is_secret<P>(
    platform: &P,
    org: &str,
    team_slug: &str,
) -> Result<(), ManagerError>
where
    P: RunnerGroupPlatform + ?Sized,
{
    info!("Verifying team exists");
    let team = match platform.get_team(org, team_slug) {
        Ok(team) => team,
        Err(error) if error.is_not_found() => {
            warn!("Team does not exist");
            return Err(ManagerError::not_found(TEAM_NOT_VERIFIED_MESSAGE));
        }
        Err(error) => return Err(ManagerError::remote(TEAM_NOT_VERIFIED_MESSAGE, error)),
    };

    info!("Verifying team privacy is set to secret");
    let privacy = team.privacy.as_deref().unwrap_or_default();
    if privacy != SECRET_TEAM_PRIVACY {
        warn!(privacy, "Team is not private");
        return Err(ManagerError::authorization(TEAM_NOT_PRIVATE_MESSAGE));
    }
    info!("Team exists");
    Ok(())
}

pub fn verify_maintainership<P>(
    platform: &P,
    org: &str,
    team_slug: &str,
    actor: &str,
) -> Result<(), ManagerError>
where
    P: RunnerGroupPlatform + ?Sized,
{
    info!(actor, "Verifying requester is a maintainer of the team");
    let membership = match platform.get_team_membership(org, team_slug, actor) {
        Ok(membership) => membership,
        Err(error) if error.is_not_found() => {
            warn!(actor, "requester is not a member of the team");
            return Err(ManagerError::authorization(MAINTAINER_NOT_VERIFIED_MESSAGE));
        }
        Err(error) => return Err(ManagerError::remote(MAINTAINER_NOT_VERIFIED_MESSAGE, error)),
    };
    if membership.role != MAINTAINER_ROLE {
        warn!(actor, role = %membership.role, "requester is not a maintainer of the team");
        return Err(ManagerError::authorization(MAINTAINER_NOT_VERIFIED_MESSAGE));
    }
    Ok(())
}

/// Team existence and maintainership, in that order.
pub fn verify_target_team<P>(
    platform: &P,
    org: &str,
    team_slug: &str,
    actor: &str,
) -> Result<VerifiedTeam, ManagerError>
where
    P: RunnerGroupPlatform + ?Sized,
{
    verify_team_is_secret(platform, org, team_slug)?;
    verify_maintainership(platform, org, team_slug, actor)?;
    Ok(VerifiedTeam {
        slug: team_slug.to_string(),
    })
}
