//! Storage-neutral query descriptors.
//!
//! Field and table names are `&'static str` so they can only come from compiled-in entity
//! schemas, never from request input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::value::FieldValue;

/// Column holding the owning organization on every tenant-scoped table.
pub const TENANT_FIELD: &str = "organization_id";
/// Primary key column, also the secondary sort key of every ordering.
pub const ID_FIELD: &str = "id";

/// One record as returned by the executor, keyed by column name.
pub type Row = Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NumericRange {
	pub min: f64,
	pub max: f64,
}
impl NumericRange {
	pub fn contains(&self, value: f64) -> bool {
		value >= self.min && value <= self.max
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
	/// Column equals any of `values`.
	EqualsOneOf { field: &'static str, values: Vec<FieldValue> },
	/// Array column shares at least one element with `values`.
	ArrayOverlaps { field: &'static str, values: Vec<String> },
	/// Column falls inside any of `ranges`, each inclusive.
	NumericRange { field: &'static str, ranges: Vec<NumericRange> },
	BooleanEquals { field: &'static str, value: bool },
	/// Case-insensitive substring match against any of `fields`.
	TextMatch { fields: Vec<&'static str>, term: String },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
	#[default]
	Asc,
	Desc,
}
impl SortDirection {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OrderBy {
	pub field: &'static str,
	pub direction: SortDirection,
}

/// Continuation marker: the sort value and id of the last row already returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
	pub value: FieldValue,
	pub id: Uuid,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageStart {
	/// Rows strictly after the cursor in sort order, or from the start when `None`.
	After(Option<Cursor>),
	Offset(u64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryFilter {
	pub table: &'static str,
	pub organization_id: Uuid,
	pub constraints: Vec<Constraint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
	pub filter: QueryFilter,
	pub order: OrderBy,
	pub start: PageStart,
	pub limit: u32,
}

#[cfg(test)]
mod tests {
	use crate::query::{Constraint, NumericRange};

	#[test]
	fn fractional_ranges_are_inclusive() {
		let range = NumericRange { min: 2.5, max: 4.0 };

		assert!(range.contains(2.5));
		assert!(range.contains(4.0));
		assert!(!range.contains(2.499));
		assert!(!range.contains(f64::NAN));
	}

	#[test]
	fn range_constraints_compare_by_bounds() {
		let ranges = vec![NumericRange { min: 8.0, max: 10.0 }, NumericRange { min: 0.5, max: 1.5 }];
		let constraint = Constraint::NumericRange { field: "engagement_score", ranges: ranges.clone() };

		assert_eq!(constraint, Constraint::NumericRange { field: "engagement_score", ranges });
		assert_ne!(
			constraint,
			Constraint::NumericRange {
				field: "engagement_score",
				ranges: vec![NumericRange { min: 8.0, max: 9.5 }],
			}
		);
	}
}
