//! Six-band urgency indicator used for display badges.
//!
//! The stored task priority always comes from the four-band [`PriorityLevel`]. This table exists
//! for views that render a finer-grained urgency hint from the same calculated score.

use serde::{Deserialize, Serialize};

use crate::priority::PriorityLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorBand {
	Minimal,
	Low,
	Moderate,
	Elevated,
	High,
	Urgent,
}
impl IndicatorBand {
	/// Lower bounds are inclusive: 85, 68, 51, 34, 17.
	pub fn from_score(score: u32) -> Self {
		match score {
			85.. => Self::Urgent,
			68..=84 => Self::High,
			51..=67 => Self::Elevated,
			34..=50 => Self::Moderate,
			17..=33 => Self::Low,
			_ => Self::Minimal,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Minimal => "Minimal",
			Self::Low => "Low",
			Self::Moderate => "Moderate",
			Self::Elevated => "Elevated",
			Self::High => "High",
			Self::Urgent => "Urgent",
		}
	}
}

/// Names the two banding tables so callers pick one explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandingScheme {
	#[default]
	FourBand,
	SixBand,
}
impl BandingScheme {
	pub fn label_for(self, score: u32) -> &'static str {
		match self {
			Self::FourBand => PriorityLevel::from_score(score).label(),
			Self::SixBand => IndicatorBand::from_score(score).label(),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::indicator::{BandingScheme, IndicatorBand};

	#[test]
	fn six_band_boundaries() {
		assert_eq!(IndicatorBand::from_score(16), IndicatorBand::Minimal);
		assert_eq!(IndicatorBand::from_score(17), IndicatorBand::Low);
		assert_eq!(IndicatorBand::from_score(33), IndicatorBand::Low);
		assert_eq!(IndicatorBand::from_score(34), IndicatorBand::Moderate);
		assert_eq!(IndicatorBand::from_score(51), IndicatorBand::Elevated);
		assert_eq!(IndicatorBand::from_score(68), IndicatorBand::High);
		assert_eq!(IndicatorBand::from_score(84), IndicatorBand::High);
		assert_eq!(IndicatorBand::from_score(85), IndicatorBand::Urgent);
	}

	#[test]
	fn schemes_disagree_where_tables_differ() {
		assert_eq!(BandingScheme::FourBand.label_for(70), "High");
		assert_eq!(BandingScheme::SixBand.label_for(70), "High");
		assert_eq!(BandingScheme::FourBand.label_for(55), "Medium");
		assert_eq!(BandingScheme::SixBand.label_for(55), "Elevated");
	}
}
