use std::time::Duration;

use tokio::time;
use uuid::Uuid;

use rapport_storage::ProfileDirectory;

use crate::{Error, Result};

const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Resolves the organization that scopes `user_id`'s queries.
///
/// Lookup failures are retried up to `policy.resolve_attempts` times in total with doubling
/// backoff. A user without a profile fails at once.
pub async fn resolve_organization(
	directory: &dyn ProfileDirectory,
	user_id: Uuid,
	policy: &rapport_config::Tenant,
) -> Result<Uuid> {
	let attempts = policy.resolve_attempts.max(1);
	let mut backoff = Duration::from_millis(policy.resolve_backoff_ms);
	let mut attempt = 0;

	loop {
		attempt += 1;

		match directory.organization_for_user(user_id).await {
			Ok(Some(organization_id)) => return Ok(organization_id),
			Ok(None) => {
				tracing::error!(%user_id, "User has no organization.");

				return Err(Error::TenantResolution {
					message: format!("No organization is linked to user {user_id}."),
				});
			},
			Err(err) if attempt < attempts => {
				tracing::warn!(%user_id, attempt, error = %err, "Tenant resolution failed. Retrying.");

				time::sleep(backoff).await;

				backoff = backoff.saturating_mul(2).min(MAX_BACKOFF);
			},
			Err(err) => {
				tracing::error!(%user_id, attempt, error = %err, "Tenant resolution failed.");

				return Err(Error::TenantResolution {
					message: format!("Failed to resolve organization after {attempt} attempts: {err}"),
				});
			},
		}
	}
}
