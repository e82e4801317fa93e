//! In-process executor with the same ordering and filtering semantics as [`crate::postgres`].
//!
//! Backs the HTTP tests and local demos where no database is available.

use std::{
	cmp::Ordering,
	collections::HashMap,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	BoxFuture, Error, ProfileDirectory, QueryExecutor, RecordStore, Result,
	models::{CONTACTS_TABLE, Profile, TASKS_TABLE},
	query::{
		Constraint, Cursor, ID_FIELD, OrderBy, PageStart, QueryFilter, QueryRequest, Row,
		SortDirection, TENANT_FIELD,
	},
	time_serde,
};

#[derive(Debug, Default)]
pub struct MemoryExecutor {
	tables: RwLock<HashMap<&'static str, Vec<Row>>>,
	profiles: RwLock<HashMap<Uuid, Uuid>>,
}
impl MemoryExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert<T>(&self, table: &'static str, record: &T) -> Result<()>
	where
		T: Serialize,
	{
		let row = match serde_json::to_value(record) {
			Ok(Value::Object(row)) => row,
			Ok(other) => return Err(Error::InvalidArgument(format!("expected an object, got {other}"))),
			Err(err) => return Err(Error::InvalidArgument(err.to_string())),
		};

		write(&self.tables)?.entry(table).or_default().push(row);

		Ok(())
	}

	pub fn insert_profile(&self, profile: &Profile) -> Result<()> {
		write(&self.profiles)?.insert(profile.user_id, profile.organization_id);

		Ok(())
	}

	/// Returns a copy of the stored row with `id`, if any.
	pub fn get(&self, table: &'static str, id: Uuid) -> Result<Option<Row>> {
		let tables = read(&self.tables)?;
		let row = tables
			.get(table)
			.and_then(|rows| rows.iter().find(|row| row_id(row) == Some(id)))
			.cloned();

		Ok(row)
	}

	fn matching(&self, filter: &QueryFilter) -> Result<Vec<Row>> {
		let tables = read(&self.tables)?;
		let tenant = Value::String(filter.organization_id.to_string());
		let rows = tables
			.get(filter.table)
			.map(|rows| {
				rows.iter()
					.filter(|row| row.get(TENANT_FIELD) == Some(&tenant))
					.filter(|row| filter.constraints.iter().all(|constraint| matches(row, constraint)))
					.cloned()
					.collect()
			})
			.unwrap_or_default();

		Ok(rows)
	}

	fn select(&self, request: &QueryRequest) -> Result<Vec<Row>> {
		let mut rows = self.matching(&request.filter)?;
		let order = request.order;

		rows.sort_by(|a, b| compare_rows(a, b, order));

		let limit = request.limit as usize;
		let page = match &request.start {
			PageStart::After(None) => rows.into_iter().take(limit).collect(),
			PageStart::After(Some(cursor)) => {
				if cursor.value.is_null() {
					return Err(Error::InvalidArgument(
						"cursor sort value must not be null".to_string(),
					));
				}

				rows.into_iter().filter(|row| is_after(row, cursor, order)).take(limit).collect()
			},
			PageStart::Offset(offset) => rows
				.into_iter()
				.skip(usize::try_from(*offset).unwrap_or(usize::MAX))
				.take(limit)
				.collect(),
		};

		Ok(page)
	}
}
impl QueryExecutor for MemoryExecutor {
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		Box::pin(async move { self.select(request) })
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(self.matching(filter)?.len() as u64) })
	}
}
impl RecordStore for MemoryExecutor {
	fn engagement_score<'a>(
		&'a self,
		organization_id: Uuid,
		contact_id: Uuid,
	) -> BoxFuture<'a, Result<Option<i32>>> {
		Box::pin(async move {
			let score = self
				.get(CONTACTS_TABLE, contact_id)?
				.filter(|row| row_tenant(row) == Some(organization_id))
				.and_then(|row| row.get("engagement_score").and_then(Value::as_i64))
				.and_then(|score| i32::try_from(score).ok());

			Ok(score)
		})
	}

	fn set_task_priority<'a>(
		&'a self,
		organization_id: Uuid,
		task_id: Uuid,
		priority: i32,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tables = write(&self.tables)?;
			let task = tables.get_mut(TASKS_TABLE).and_then(|rows| {
				rows.iter_mut().find(|row| {
					row_id(row) == Some(task_id) && row_tenant(row) == Some(organization_id)
				})
			});
			let Some(task) = task else {
				return Err(Error::NotFound(format!("task {task_id}")));
			};

			task.insert("priority".to_string(), Value::from(priority));

			if let Ok(now) = time_serde::format(&OffsetDateTime::now_utc()) {
				task.insert("updated_at".to_string(), Value::String(now));
			}

			Ok(())
		})
	}
}
impl ProfileDirectory for MemoryExecutor {
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>> {
		Box::pin(async move { Ok(read(&self.profiles)?.get(&user_id).copied()) })
	}
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
	lock.read().map_err(|_| Error::Unavailable("memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
	lock.write().map_err(|_| Error::Unavailable("memory store lock poisoned".to_string()))
}

fn row_id(row: &Row) -> Option<Uuid> {
	row.get(ID_FIELD).and_then(Value::as_str).and_then(|raw| Uuid::parse_str(raw).ok())
}

fn row_tenant(row: &Row) -> Option<Uuid> {
	row.get(TENANT_FIELD).and_then(Value::as_str).and_then(|raw| Uuid::parse_str(raw).ok())
}

fn matches(row: &Row, constraint: &Constraint) -> bool {
	match constraint {
		Constraint::EqualsOneOf { field, values } => {
			let Some(actual) = row.get(*field).filter(|value| !value.is_null()) else {
				return false;
			};

			values.iter().any(|value| compare_json(actual, &value.to_json()) == Ordering::Equal)
		},
		Constraint::ArrayOverlaps { field, values } => row
			.get(*field)
			.and_then(Value::as_array)
			.is_some_and(|items| {
				items.iter().filter_map(Value::as_str).any(|item| values.iter().any(|v| v == item))
			}),
		Constraint::NumericRange { field, ranges } => row
			.get(*field)
			.and_then(Value::as_f64)
			.is_some_and(|value| ranges.iter().any(|range| range.contains(value))),
		Constraint::BooleanEquals { field, value } =>
			row.get(*field).and_then(Value::as_bool) == Some(*value),
		Constraint::TextMatch { fields, term } => {
			let needle = term.to_lowercase();

			fields.is_empty()
				|| fields.iter().any(|field| {
					row.get(*field)
						.and_then(Value::as_str)
						.is_some_and(|text| text.to_lowercase().contains(&needle))
				})
		},
	}
}

fn compare_rows(a: &Row, b: &Row, order: OrderBy) -> Ordering {
	let ordering = compare_json(
		a.get(order.field).unwrap_or(&Value::Null),
		b.get(order.field).unwrap_or(&Value::Null),
	)
	.then_with(|| row_id(a).cmp(&row_id(b)));

	match order.direction {
		SortDirection::Asc => ordering,
		SortDirection::Desc => ordering.reverse(),
	}
}

fn is_after(row: &Row, cursor: &Cursor, order: OrderBy) -> bool {
	let ordering = compare_json(row.get(order.field).unwrap_or(&Value::Null), &cursor.value.to_json())
		.then_with(|| row_id(row).cmp(&Some(cursor.id)));

	match order.direction {
		SortDirection::Asc => ordering == Ordering::Greater,
		SortDirection::Desc => ordering == Ordering::Less,
	}
}

/// Nulls sort after every value, as Postgres does for ascending order.
fn compare_json(a: &Value, b: &Value) -> Ordering {
	match (a, b) {
		(Value::Null, Value::Null) => Ordering::Equal,
		(Value::Null, _) => Ordering::Greater,
		(_, Value::Null) => Ordering::Less,
		(Value::Bool(a), Value::Bool(b)) => a.cmp(b),
		(Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
			(Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
			_ => Ordering::Equal,
		},
		(Value::String(a), Value::String(b)) =>
			match (time_serde::parse(a), time_serde::parse(b)) {
				(Ok(a), Ok(b)) => a.cmp(&b),
				_ => a.cmp(b),
			},
		_ => Ordering::Equal,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use uuid::Uuid;

	use crate::{
		QueryExecutor,
		memory::MemoryExecutor,
		query::{
			Constraint, Cursor, NumericRange, OrderBy, PageStart, QueryFilter, QueryRequest,
			SortDirection,
		},
		value::FieldValue,
	};

	fn seeded(org: Uuid) -> MemoryExecutor {
		let executor = MemoryExecutor::new();

		for (idx, score) in [3, 9, 8, 3].into_iter().enumerate() {
			let id = Uuid::from_u128(idx as u128 + 1);

			executor
				.insert(
					"contacts",
					&json!({
						"id": id,
						"organization_id": org,
						"engagement_score": score,
						"last_name": format!("Name {idx}"),
					}),
				)
				.expect("Failed to insert row.");
		}

		executor
			.insert("contacts", &json!({ "id": Uuid::from_u128(99), "organization_id": Uuid::nil() }))
			.expect("Failed to insert row.");

		executor
	}

	fn request(org: Uuid, start: PageStart) -> QueryRequest {
		QueryRequest {
			filter: QueryFilter { table: "contacts", organization_id: org, constraints: Vec::new() },
			order: OrderBy { field: "engagement_score", direction: SortDirection::Asc },
			start,
			limit: 10,
		}
	}

	fn ids(rows: &[crate::Row]) -> Vec<Uuid> {
		rows.iter()
			.map(|row| Uuid::parse_str(row["id"].as_str().expect("id")).expect("uuid"))
			.collect()
	}

	#[tokio::test]
	async fn rows_are_scoped_to_tenant_and_ordered_by_sort_then_id() {
		let org = Uuid::from_u128(7);
		let executor = seeded(org);
		let rows = executor
			.run_query(&request(org, PageStart::After(None)))
			.await
			.expect("Query must succeed.");

		assert_eq!(
			ids(&rows),
			vec![Uuid::from_u128(1), Uuid::from_u128(4), Uuid::from_u128(3), Uuid::from_u128(2)]
		);
	}

	#[tokio::test]
	async fn cursor_breaks_ties_on_id() {
		let org = Uuid::from_u128(7);
		let executor = seeded(org);
		let cursor = Cursor { value: FieldValue::Integer(3), id: Uuid::from_u128(1) };
		let rows = executor
			.run_query(&request(org, PageStart::After(Some(cursor))))
			.await
			.expect("Query must succeed.");

		assert_eq!(ids(&rows), vec![Uuid::from_u128(4), Uuid::from_u128(3), Uuid::from_u128(2)]);
	}

	#[tokio::test]
	async fn ranges_and_counts_apply_constraints() {
		let org = Uuid::from_u128(7);
		let executor = seeded(org);
		let filter = QueryFilter {
			table: "contacts",
			organization_id: org,
			constraints: vec![Constraint::NumericRange {
				field: "engagement_score",
				ranges: vec![NumericRange { min: 8.0, max: 10.0 }],
			}],
		};

		assert_eq!(executor.count(&filter).await.expect("Count must succeed."), 2);
	}
}
