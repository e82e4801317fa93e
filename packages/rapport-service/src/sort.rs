use serde::{Deserialize, Serialize};

use rapport_storage::{OrderBy, SortDirection};

use crate::entity::EntitySchema;

/// Requested ordering as received from a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
	pub field: String,
	#[serde(default)]
	pub direction: SortDirection,
}
impl SortConfig {
	pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
		Self { field: field.into(), direction }
	}
}

/// Resolves a requested sort against the schema, falling back to the schema default for
/// fields that are not sortable.
pub fn resolve(schema: &EntitySchema, requested: Option<&SortConfig>) -> OrderBy {
	let Some(requested) = requested else {
		return schema.default_sort;
	};

	match schema.sort_spec(requested.field.trim()) {
		Some(spec) => OrderBy { field: spec.field, direction: requested.direction },
		None => {
			tracing::warn!(
				entity = schema.name,
				field = requested.field.as_str(),
				fallback = schema.default_sort.field,
				"Unsupported sort field replaced by default."
			);

			schema.default_sort
		},
	}
}

#[cfg(test)]
mod tests {
	use rapport_storage::{OrderBy, SortDirection};

	use crate::{
		entity::{CONTACTS, TASKS},
		sort::{self, SortConfig},
	};

	#[test]
	fn sortable_fields_keep_requested_direction() {
		let order = sort::resolve(&TASKS, Some(&SortConfig::new("priority", SortDirection::Desc)));

		assert_eq!(order, OrderBy { field: "priority", direction: SortDirection::Desc });
	}

	#[test]
	fn unsupported_fields_fall_back_to_default() {
		let order =
			sort::resolve(&CONTACTS, Some(&SortConfig::new("engagement_score", SortDirection::Asc)));

		assert_eq!(order, CONTACTS.default_sort);
		assert_eq!(sort::resolve(&CONTACTS, None), CONTACTS.default_sort);
	}
}
