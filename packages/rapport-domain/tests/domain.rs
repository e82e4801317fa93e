use rapport_domain::{
	IMPORTANCE_CATALOG, NEUTRAL_IMPORTANCE, PriorityLevel, calculate_priority, importance_of,
};

fn level_for(score: u32) -> u8 {
	PriorityLevel::from_score(score).value()
}

#[test]
fn score_is_engagement_times_importance_for_whole_domain() {
	for entry in IMPORTANCE_CATALOG {
		for engagement in 1..=10_u8 {
			let result = calculate_priority(engagement, entry.activity_type);

			assert_eq!(result.importance_weight, entry.weight);
			assert_eq!(result.calculated_score, u32::from(engagement) * u32::from(entry.weight));
			assert!((2..=100).contains(&result.calculated_score));
		}
	}
}

#[test]
fn every_score_maps_to_exactly_one_level() {
	for score in 0..=100_u32 {
		let matching = PriorityLevel::ALL
			.iter()
			.copied()
			.filter(|level| match level {
				PriorityLevel::Critical => score >= 80,
				PriorityLevel::High => (60..80).contains(&score),
				PriorityLevel::Medium => (40..60).contains(&score),
				PriorityLevel::Low => score < 40,
			})
			.collect::<Vec<_>>();

		assert_eq!(matching.len(), 1, "score {score} matched {matching:?}");
		assert_eq!(PriorityLevel::from_score(score), matching[0]);
	}
}

#[test]
fn band_boundaries_are_inclusive_on_lower_bound() {
	assert_eq!(level_for(79), 3);
	assert_eq!(level_for(80), 4);
	assert_eq!(level_for(59), 2);
	assert_eq!(level_for(60), 3);
	assert_eq!(level_for(39), 1);
	assert_eq!(level_for(40), 2);
}

#[test]
fn unknown_activity_type_uses_neutral_weight() {
	assert_eq!(importance_of("unknown-event"), NEUTRAL_IMPORTANCE);

	let result = calculate_priority(8, "unknown-event");

	assert_eq!(result.importance_weight, 5);
	assert_eq!(result.calculated_score, 40);
	assert_eq!(result.priority_level, PriorityLevel::Medium);
	assert_eq!(result.priority_label, "Medium");
}

#[test]
fn interview_with_engaged_contact_is_critical() {
	let result = calculate_priority(9, "interview");

	assert_eq!(result.calculated_score, 90);
	assert_eq!(result.priority_level, PriorityLevel::Critical);
}

#[test]
fn calculation_serializes_level_as_number() {
	let result = calculate_priority(6, "meeting");
	let value = serde_json::to_value(&result).expect("Failed to serialize calculation.");

	assert_eq!(value["calculated_score"], 36);
	assert_eq!(value["priority_level"], 1);
	assert_eq!(value["priority_label"], "Low");
}
