//! Row types for the tenant-scoped tables.
//!
//! Rows travel as `to_jsonb` documents, so every model is serde-driven and timestamps use the
//! RFC 3339 adapters in [`crate::time_serde`].

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::time_serde;

pub const ORGANIZATIONS_TABLE: &str = "organizations";
pub const PROFILES_TABLE: &str = "profiles";
pub const CONTACTS_TABLE: &str = "contacts";
pub const CANDIDATES_TABLE: &str = "candidates";
pub const TASKS_TABLE: &str = "tasks";
pub const EVENTS_TABLE: &str = "events";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Organization {
	pub id: Uuid,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
	pub user_id: Uuid,
	pub organization_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
	pub id: Uuid,
	pub organization_id: Uuid,
	pub first_name: String,
	pub last_name: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub company: Option<String>,
	#[serde(default)]
	pub job_title: Option<String>,
	#[serde(default)]
	pub employment_status: Option<String>,
	#[serde(default)]
	pub company_size: Option<String>,
	#[serde(default)]
	pub industry: Option<String>,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub skills: Vec<String>,
	/// 1-10, `None` when the contact was never scored.
	#[serde(default)]
	pub engagement_score: Option<i32>,
	pub is_open_to_work: bool,
	pub is_favorite: bool,
	#[serde(default, with = "time_serde::option")]
	pub last_contacted_at: Option<OffsetDateTime>,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub id: Uuid,
	pub organization_id: Uuid,
	pub full_name: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub current_title: Option<String>,
	#[serde(default)]
	pub current_company: Option<String>,
	#[serde(default)]
	pub seniority: Option<String>,
	pub stage: String,
	pub years_experience: i32,
	#[serde(default)]
	pub skills: Vec<String>,
	#[serde(default)]
	pub engagement_score: Option<i32>,
	pub is_open_to_work: bool,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
	pub id: Uuid,
	pub organization_id: Uuid,
	pub contact_id: Uuid,
	#[serde(default)]
	pub event_id: Option<Uuid>,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	pub activity_type: String,
	/// Stored priority level, 1 (Low) through 4 (Critical).
	pub priority: i32,
	pub status: String,
	#[serde(with = "time_serde")]
	pub due_date: OffsetDateTime,
	pub completed: bool,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
	pub id: Uuid,
	pub organization_id: Uuid,
	#[serde(default)]
	pub contact_id: Option<Uuid>,
	pub event_type: String,
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(with = "time_serde")]
	pub occurred_at: OffsetDateTime,
	pub is_recurring: bool,
	#[serde(with = "time_serde")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time_serde")]
	pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::models::Task;

	#[test]
	fn task_decodes_from_postgres_jsonb() {
		let row = json!({
			"id": "6f1c1f43-54a4-4d8b-9f8e-6a3a1f0b2c10",
			"organization_id": "0b8f5a9e-3c35-4c6a-9f0e-0d3b7f6c9a11",
			"contact_id": "4d2f3e1a-8b7c-4a5d-9e6f-1a2b3c4d5e6f",
			"event_id": null,
			"title": "Prep interview",
			"description": null,
			"activity_type": "interview",
			"priority": 4,
			"status": "open",
			"due_date": "2024-05-01T09:00:00+00:00",
			"completed": false,
			"created_at": "2024-04-01T09:00:00.123456+00:00",
			"updated_at": "2024-04-01T09:00:00.123456+00:00"
		});
		let task: Task = serde_json::from_value(row).expect("Failed to decode task.");

		assert_eq!(task.priority, 4);
		assert!(task.event_id.is_none());
		assert_eq!(task.due_date.hour(), 9);
	}
}
