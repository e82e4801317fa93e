//! Per-entity feed descriptions.
//!
//! One [`EntitySchema`] drives filter compilation, sort validation and cursor extraction for
//! its table, so contacts, candidates, tasks and events share a single feed implementation.

use serde::de::DeserializeOwned;

use rapport_storage::{
	FieldKind, OrderBy, SortDirection,
	models::{
		CANDIDATES_TABLE, CONTACTS_TABLE, Candidate, Contact, EVENTS_TABLE, Event, TASKS_TABLE, Task,
	},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetMode {
	/// Column equals one of the selected values.
	Discrete,
	/// Array column shares at least one selected value.
	ArrayOverlap,
	/// Selected `"min-max"` strings. A non-empty range selection replaces the `supersedes` facet.
	Range { supersedes: Option<&'static str> },
	/// Applied only when the flag is set.
	Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetSpec {
	pub name: &'static str,
	pub field: &'static str,
	pub kind: FieldKind,
	pub mode: FacetMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
	pub field: &'static str,
	pub kind: FieldKind,
}

#[derive(Debug)]
pub struct EntitySchema {
	pub name: &'static str,
	pub table: &'static str,
	pub search_fields: &'static [&'static str],
	pub facets: &'static [FacetSpec],
	/// Non-nullable columns only.
	pub sortable: &'static [SortSpec],
	pub default_sort: OrderBy,
}
impl EntitySchema {
	pub fn facet(&self, name: &str) -> Option<&FacetSpec> {
		self.facets.iter().find(|facet| facet.name == name)
	}

	pub fn sort_spec(&self, field: &str) -> Option<&SortSpec> {
		self.sortable.iter().find(|spec| spec.field == field)
	}
}

/// A record type served by a feed.
pub trait FeedEntity
where
	Self: DeserializeOwned + Send + Sync + 'static,
{
	fn schema() -> &'static EntitySchema;
}

const fn facet(name: &'static str, field: &'static str, kind: FieldKind, mode: FacetMode) -> FacetSpec {
	FacetSpec { name, field, kind, mode }
}

const fn sort(field: &'static str, kind: FieldKind) -> SortSpec {
	SortSpec { field, kind }
}

pub static CONTACTS: EntitySchema = EntitySchema {
	name: "contacts",
	table: CONTACTS_TABLE,
	search_fields: &["first_name", "last_name", "email", "company", "job_title"],
	facets: &[
		facet("employment_status", "employment_status", FieldKind::Text, FacetMode::Discrete),
		facet("company_size", "company_size", FieldKind::Text, FacetMode::Discrete),
		facet("industry", "industry", FieldKind::Text, FacetMode::Discrete),
		facet("skills", "skills", FieldKind::TextArray, FacetMode::ArrayOverlap),
		facet("engagement_score", "engagement_score", FieldKind::Integer, FacetMode::Discrete),
		facet(
			"engagement_range",
			"engagement_score",
			FieldKind::Integer,
			FacetMode::Range { supersedes: Some("engagement_score") },
		),
		facet("is_open_to_work", "is_open_to_work", FieldKind::Bool, FacetMode::Boolean),
		facet("is_favorite", "is_favorite", FieldKind::Bool, FacetMode::Boolean),
	],
	sortable: &[
		sort("created_at", FieldKind::Timestamp),
		sort("updated_at", FieldKind::Timestamp),
		sort("last_name", FieldKind::Text),
		sort("first_name", FieldKind::Text),
	],
	default_sort: OrderBy { field: "created_at", direction: SortDirection::Desc },
};

pub static CANDIDATES: EntitySchema = EntitySchema {
	name: "candidates",
	table: CANDIDATES_TABLE,
	search_fields: &["full_name", "email", "current_title", "current_company"],
	facets: &[
		facet("stage", "stage", FieldKind::Text, FacetMode::Discrete),
		facet("seniority", "seniority", FieldKind::Text, FacetMode::Discrete),
		facet("skills", "skills", FieldKind::TextArray, FacetMode::ArrayOverlap),
		facet("engagement_score", "engagement_score", FieldKind::Integer, FacetMode::Discrete),
		facet(
			"engagement_range",
			"engagement_score",
			FieldKind::Integer,
			FacetMode::Range { supersedes: Some("engagement_score") },
		),
		facet(
			"experience_range",
			"years_experience",
			FieldKind::Integer,
			FacetMode::Range { supersedes: None },
		),
		facet("is_open_to_work", "is_open_to_work", FieldKind::Bool, FacetMode::Boolean),
	],
	sortable: &[
		sort("created_at", FieldKind::Timestamp),
		sort("updated_at", FieldKind::Timestamp),
		sort("full_name", FieldKind::Text),
		sort("years_experience", FieldKind::Integer),
	],
	default_sort: OrderBy { field: "created_at", direction: SortDirection::Desc },
};

pub static TASKS: EntitySchema = EntitySchema {
	name: "tasks",
	table: TASKS_TABLE,
	search_fields: &["title", "description"],
	facets: &[
		facet("status", "status", FieldKind::Text, FacetMode::Discrete),
		facet("activity_type", "activity_type", FieldKind::Text, FacetMode::Discrete),
		facet("priority", "priority", FieldKind::Integer, FacetMode::Discrete),
		facet(
			"priority_range",
			"priority",
			FieldKind::Integer,
			FacetMode::Range { supersedes: Some("priority") },
		),
		facet("completed", "completed", FieldKind::Bool, FacetMode::Boolean),
	],
	sortable: &[
		sort("due_date", FieldKind::Timestamp),
		sort("priority", FieldKind::Integer),
		sort("created_at", FieldKind::Timestamp),
		sort("updated_at", FieldKind::Timestamp),
		sort("title", FieldKind::Text),
	],
	default_sort: OrderBy { field: "due_date", direction: SortDirection::Asc },
};

pub static EVENTS: EntitySchema = EntitySchema {
	name: "events",
	table: EVENTS_TABLE,
	search_fields: &["title", "description"],
	facets: &[
		facet("event_type", "event_type", FieldKind::Text, FacetMode::Discrete),
		facet("is_recurring", "is_recurring", FieldKind::Bool, FacetMode::Boolean),
	],
	sortable: &[
		sort("occurred_at", FieldKind::Timestamp),
		sort("created_at", FieldKind::Timestamp),
		sort("title", FieldKind::Text),
	],
	default_sort: OrderBy { field: "occurred_at", direction: SortDirection::Desc },
};

pub static ENTITY_SCHEMAS: [&EntitySchema; 4] = [&CONTACTS, &CANDIDATES, &TASKS, &EVENTS];

pub fn schema_for(name: &str) -> Option<&'static EntitySchema> {
	ENTITY_SCHEMAS.iter().copied().find(|schema| schema.name == name)
}

impl FeedEntity for Contact {
	fn schema() -> &'static EntitySchema {
		&CONTACTS
	}
}

impl FeedEntity for Candidate {
	fn schema() -> &'static EntitySchema {
		&CANDIDATES
	}
}

impl FeedEntity for Task {
	fn schema() -> &'static EntitySchema {
		&TASKS
	}
}

impl FeedEntity for Event {
	fn schema() -> &'static EntitySchema {
		&EVENTS
	}
}

#[cfg(test)]
mod tests {
	use crate::entity::{ENTITY_SCHEMAS, FacetMode, schema_for};

	#[test]
	fn default_sorts_are_sortable() {
		for schema in ENTITY_SCHEMAS {
			assert!(
				schema.sort_spec(schema.default_sort.field).is_some(),
				"{} default sort must be listed as sortable",
				schema.name
			);
		}
	}

	#[test]
	fn superseded_facets_exist_on_the_same_field() {
		for schema in ENTITY_SCHEMAS {
			for facet in schema.facets {
				if let FacetMode::Range { supersedes: Some(target) } = facet.mode {
					let target = schema.facet(target).expect("Superseded facet must exist.");

					assert_eq!(target.field, facet.field);
					assert_eq!(target.mode, FacetMode::Discrete);
				}
			}
		}
	}

	#[test]
	fn schemas_resolve_by_name() {
		assert_eq!(schema_for("tasks").map(|schema| schema.table), Some("tasks"));
		assert!(schema_for("organizations").is_none());
	}
}
