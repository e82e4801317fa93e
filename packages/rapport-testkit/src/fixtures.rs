//! Deterministic records for feed and scoring tests.
//!
//! Ids are derived from small integers so assertions can name rows directly. Creation times
//! repeat in groups of three to exercise the id tiebreaker.

use serde::Serialize;
use sqlx::{PgPool, types::Json};
use time::{Duration, OffsetDateTime, macros::datetime};
use uuid::Uuid;

use rapport_storage::{
	memory::MemoryExecutor,
	models::{
		CANDIDATES_TABLE, CONTACTS_TABLE, Candidate, Contact, EVENTS_TABLE, Event, ORGANIZATIONS_TABLE,
		Organization, Profile, TASKS_TABLE, Task,
	},
};

use crate::Result;

const BASE_TIME: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);
const STATUSES: [&str; 3] = ["employed", "unemployed", "freelance"];
const STAGES: [&str; 4] = ["sourced", "screen", "interview", "offer"];
const ACTIVITY_TYPES: [&str; 4] = ["interview", "email", "follow-up", "meeting"];

pub fn organization_id() -> Uuid {
	Uuid::from_u128(0xA000)
}

pub fn other_organization_id() -> Uuid {
	Uuid::from_u128(0xB000)
}

pub fn user_id() -> Uuid {
	Uuid::from_u128(0xC000)
}

pub fn contact_id(n: u32) -> Uuid {
	Uuid::from_u128(0x1_0000 + u128::from(n))
}

pub fn candidate_id(n: u32) -> Uuid {
	Uuid::from_u128(0x2_0000 + u128::from(n))
}

pub fn task_id(n: u32) -> Uuid {
	Uuid::from_u128(0x3_0000 + u128::from(n))
}

pub fn event_id(n: u32) -> Uuid {
	Uuid::from_u128(0x4_0000 + u128::from(n))
}

fn created_at(n: u32) -> OffsetDateTime {
	BASE_TIME + Duration::hours(i64::from(n / 3))
}

/// Engagement cycles through 1-10. Every fifth contact has no score.
pub fn contact(organization_id: Uuid, n: u32) -> Contact {
	let status = STATUSES[n as usize % STATUSES.len()];

	Contact {
		id: contact_id(n),
		organization_id,
		first_name: format!("First{n:03}"),
		last_name: format!("Last{n:03}"),
		email: Some(format!("contact{n}@example.com")),
		company: Some(format!("Company {}", n % 4)),
		job_title: Some("Engineer".to_string()),
		employment_status: Some(status.to_string()),
		company_size: Some(if n % 2 == 0 { "11-50" } else { "51-200" }.to_string()),
		industry: Some("software".to_string()),
		location: None,
		skills: if n % 2 == 0 {
			vec!["rust".to_string(), "sql".to_string()]
		} else {
			vec!["go".to_string()]
		},
		engagement_score: if n % 5 == 4 { None } else { Some((n % 10) as i32 + 1) },
		is_open_to_work: n % 3 == 0,
		is_favorite: n % 7 == 0,
		last_contacted_at: None,
		created_at: created_at(n),
		updated_at: created_at(n),
	}
}

pub fn candidate(organization_id: Uuid, n: u32) -> Candidate {
	Candidate {
		id: candidate_id(n),
		organization_id,
		full_name: format!("Candidate {n:03}"),
		email: Some(format!("candidate{n}@example.com")),
		current_title: Some("Developer".to_string()),
		current_company: None,
		seniority: Some(if n % 2 == 0 { "senior" } else { "junior" }.to_string()),
		stage: STAGES[n as usize % STAGES.len()].to_string(),
		years_experience: (n % 15) as i32,
		skills: vec!["rust".to_string()],
		engagement_score: Some((n % 10) as i32 + 1),
		is_open_to_work: n % 2 == 1,
		created_at: created_at(n),
		updated_at: created_at(n),
	}
}

pub fn task(organization_id: Uuid, contact_id: Uuid, n: u32) -> Task {
	Task {
		id: task_id(n),
		organization_id,
		contact_id,
		event_id: None,
		title: format!("Task {n:03}"),
		description: None,
		activity_type: ACTIVITY_TYPES[n as usize % ACTIVITY_TYPES.len()].to_string(),
		priority: (n % 4) as i32 + 1,
		status: if n % 2 == 0 { "open" } else { "done" }.to_string(),
		due_date: BASE_TIME + Duration::days(i64::from(n % 5)),
		completed: n % 2 == 1,
		created_at: created_at(n),
		updated_at: created_at(n),
	}
}

pub fn event(organization_id: Uuid, n: u32) -> Event {
	Event {
		id: event_id(n),
		organization_id,
		contact_id: None,
		event_type: if n % 2 == 0 { "layoff" } else { "new-job-posting" }.to_string(),
		title: format!("Event {n:03}"),
		description: None,
		occurred_at: created_at(n),
		is_recurring: false,
		created_at: created_at(n),
		updated_at: created_at(n),
	}
}

/// Seeds `count` records of every entity for [`organization_id`], a single foreign row per
/// table for [`other_organization_id`], and a profile mapping [`user_id`] to the organization.
pub fn seed_memory(executor: &MemoryExecutor, count: u32) -> Result<()> {
	let org = organization_id();
	let other = other_organization_id();

	executor.insert(ORGANIZATIONS_TABLE, &Organization { id: org, name: "Acme".to_string() })?;
	executor.insert_profile(&Profile { user_id: user_id(), organization_id: org })?;

	for n in 0..count {
		executor.insert(CONTACTS_TABLE, &contact(org, n))?;
		executor.insert(CANDIDATES_TABLE, &candidate(org, n))?;
		executor.insert(TASKS_TABLE, &task(org, contact_id(n), n))?;
		executor.insert(EVENTS_TABLE, &event(org, n))?;
	}

	executor.insert(CONTACTS_TABLE, &contact(other, 10_000))?;
	executor.insert(CANDIDATES_TABLE, &candidate(other, 10_000))?;
	executor.insert(TASKS_TABLE, &task(other, contact_id(10_000), 10_000))?;
	executor.insert(EVENTS_TABLE, &event(other, 10_000))?;

	Ok(())
}

/// Postgres counterpart of [`seed_memory`]. Expects the schema to be bootstrapped.
pub async fn seed_postgres(pool: &PgPool, count: u32) -> Result<()> {
	let org = organization_id();
	let other = other_organization_id();

	for (id, name) in [(org, "Acme"), (other, "Other")] {
		sqlx::query("INSERT INTO organizations (id, name) VALUES ($1, $2)")
			.bind(id)
			.bind(name)
			.execute(pool)
			.await?;
	}

	sqlx::query("INSERT INTO profiles (user_id, organization_id) VALUES ($1, $2)")
		.bind(user_id())
		.bind(org)
		.execute(pool)
		.await?;

	for n in 0..count {
		insert_row(pool, CONTACTS_TABLE, &contact(org, n)).await?;
		insert_row(pool, CANDIDATES_TABLE, &candidate(org, n)).await?;
		insert_row(pool, TASKS_TABLE, &task(org, contact_id(n), n)).await?;
		insert_row(pool, EVENTS_TABLE, &event(org, n)).await?;
	}

	insert_row(pool, CONTACTS_TABLE, &contact(other, 10_000)).await?;
	insert_row(pool, CANDIDATES_TABLE, &candidate(other, 10_000)).await?;
	insert_row(pool, TASKS_TABLE, &task(other, contact_id(10_000), 10_000)).await?;
	insert_row(pool, EVENTS_TABLE, &event(other, 10_000)).await?;

	Ok(())
}

/// Inserts a model whose fields cover every column of `table`.
async fn insert_row<T>(pool: &PgPool, table: &str, record: &T) -> Result<()>
where
	T: Serialize + Sync,
{
	let sql = format!("INSERT INTO {table} SELECT * FROM jsonb_populate_record(NULL::{table}, $1)");

	sqlx::query(&sql).bind(Json(record)).execute(pool).await?;

	Ok(())
}
