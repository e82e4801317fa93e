use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::catalog::{find_entry, importance_of};

pub const ENGAGEMENT_MIN: u8 = 1;
pub const ENGAGEMENT_MAX: u8 = 10;
/// Engagement used when a contact has no stored score.
pub const NEUTRAL_ENGAGEMENT: u8 = 5;

const CRITICAL_FLOOR: u32 = 80;
const HIGH_FLOOR: u32 = 60;
const MEDIUM_FLOOR: u32 = 40;

/// Stored task priority. Discriminants are the persisted values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityLevel {
	Low = 1,
	Medium = 2,
	High = 3,
	Critical = 4,
}
impl PriorityLevel {
	pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

	/// Bands are inclusive on their lower bound: 80+, 60-79, 40-59, below 40.
	pub fn from_score(score: u32) -> Self {
		if score >= CRITICAL_FLOOR {
			Self::Critical
		} else if score >= HIGH_FLOOR {
			Self::High
		} else if score >= MEDIUM_FLOOR {
			Self::Medium
		} else {
			Self::Low
		}
	}

	pub fn value(self) -> u8 {
		self as u8
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Low => "Low",
			Self::Medium => "Medium",
			Self::High => "High",
			Self::Critical => "Critical",
		}
	}
}
impl Display for PriorityLevel {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.label())
	}
}
impl Serialize for PriorityLevel {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u8(self.value())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriorityCalculation {
	pub activity_type: String,
	pub engagement_score: u8,
	pub importance_weight: u8,
	pub calculated_score: u32,
	pub priority_level: PriorityLevel,
	pub priority_label: &'static str,
	pub explanation: String,
}

/// Combines a contact's engagement with an activity's importance.
///
/// Engagement outside 1-10 is clamped into range so the function stays total.
pub fn calculate_priority(engagement_score: u8, activity_type: &str) -> PriorityCalculation {
	let engagement_score = engagement_score.clamp(ENGAGEMENT_MIN, ENGAGEMENT_MAX);
	let importance_weight = importance_of(activity_type);
	let calculated_score = u32::from(engagement_score) * u32::from(importance_weight);
	let priority_level = PriorityLevel::from_score(calculated_score);
	let activity_type = activity_type.trim().to_string();
	let explanation = explain(
		engagement_score,
		importance_weight,
		calculated_score,
		priority_level,
		&activity_type,
	);

	PriorityCalculation {
		activity_type,
		engagement_score,
		importance_weight,
		calculated_score,
		priority_level,
		priority_label: priority_level.label(),
		explanation,
	}
}

fn explain(
	engagement_score: u8,
	importance_weight: u8,
	calculated_score: u32,
	level: PriorityLevel,
	activity_type: &str,
) -> String {
	let source = if find_entry(activity_type).is_some() {
		format!("'{activity_type}'")
	} else {
		format!("'{activity_type}' (not in catalog, neutral weight)")
	};

	format!(
		"Engagement {engagement_score} x importance {importance_weight} for {source} = {calculated_score}, which is {} priority.",
		level.label()
	)
}
