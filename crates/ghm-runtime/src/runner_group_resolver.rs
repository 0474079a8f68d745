use tracing::info;

use crate::pagination::find_in_pages;
use crate::platform::{PlatformResult, RunnerGroupPlatform};

/// Looks up the id of the runner group called `group_name`. `Ok(None)` means
/// no page of the organization listing contains it.
pub fn resolve_runner_group_id<P>(
    platform: &P,
    org: &str,
    group_name: &str,
) -> PlatformResult<Option<u64>>
where
    P: RunnerGroupPlatform + ?Sized,
{
    info!("Searching for group ID for runner group");
    let group = find_in_pages(
        |page| platform.list_runner_groups(org, page),
        |group| group.name == group_name,
    )?;
    if let Some(group) = &group {
        info!(group = %group.name, id = group.id, "Found group");
    }
    Ok(group.map(|group| group.id))
}
