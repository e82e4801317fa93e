use uuid::Uuid;

use rapport_domain::{ENGAGEMENT_MAX, ENGAGEMENT_MIN, NEUTRAL_ENGAGEMENT};
use rapport_storage::RecordStore;

/// Reads a contact's stored engagement, degrading to the neutral score when the contact is
/// missing, unscored, or the lookup fails.
pub async fn engagement_or_neutral(
	records: &dyn RecordStore,
	organization_id: Uuid,
	contact_id: Uuid,
) -> u8 {
	match records.engagement_score(organization_id, contact_id).await {
		Ok(Some(score)) => clamp_engagement(score),
		Ok(None) => NEUTRAL_ENGAGEMENT,
		Err(err) => {
			tracing::warn!(
				%contact_id,
				error = %err,
				fallback = NEUTRAL_ENGAGEMENT,
				"Engagement lookup failed. Using neutral score."
			);

			NEUTRAL_ENGAGEMENT
		},
	}
}

fn clamp_engagement(score: i32) -> u8 {
	let clamped = score.clamp(i32::from(ENGAGEMENT_MIN), i32::from(ENGAGEMENT_MAX));

	u8::try_from(clamped).unwrap_or(NEUTRAL_ENGAGEMENT)
}

#[cfg(test)]
mod tests {
	use crate::priority;

	#[test]
	fn stored_scores_are_clamped() {
		assert_eq!(priority::clamp_engagement(0), 1);
		assert_eq!(priority::clamp_engagement(7), 7);
		assert_eq!(priority::clamp_engagement(42), 10);
	}
}
