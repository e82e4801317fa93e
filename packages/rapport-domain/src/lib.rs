pub mod catalog;
pub mod indicator;
pub mod priority;

pub use catalog::{IMPORTANCE_CATALOG, ImportanceEntry, NEUTRAL_IMPORTANCE, importance_of};
pub use indicator::{BandingScheme, IndicatorBand};
pub use priority::{
	ENGAGEMENT_MAX, ENGAGEMENT_MIN, NEUTRAL_ENGAGEMENT, PriorityCalculation, PriorityLevel,
	calculate_priority,
};
