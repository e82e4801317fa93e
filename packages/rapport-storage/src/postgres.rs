//! Postgres-backed executor.
//!
//! Rows are selected as `to_jsonb(t)` so one code path serves every table. Identifiers are
//! pushed verbatim and are always compiled-in `&'static str`. Every user value is bound.

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	BoxFuture, Error, ProfileDirectory, QueryExecutor, RecordStore, Result,
	db::Db,
	models::{CONTACTS_TABLE, PROFILES_TABLE, TASKS_TABLE},
	query::{
		Constraint, Cursor, ID_FIELD, OrderBy, PageStart, QueryFilter, QueryRequest, Row,
		SortDirection, TENANT_FIELD,
	},
	value::FieldValue,
};

pub struct PgExecutor {
	pub db: Db,
}
impl PgExecutor {
	pub fn new(db: Db) -> Self {
		Self { db }
	}

	async fn select_rows(&self, request: &QueryRequest) -> Result<Vec<Row>> {
		let mut builder = QueryBuilder::new("SELECT to_jsonb(t) AS row FROM ");

		push_filter(&mut builder, &request.filter);

		if let PageStart::After(Some(cursor)) = &request.start {
			push_cursor(&mut builder, request.order, cursor)?;
		}

		push_order(&mut builder, request.order);
		builder.push(" LIMIT ");
		builder.push_bind(i64::from(request.limit));

		if let PageStart::Offset(offset) = request.start {
			builder.push(" OFFSET ");
			builder.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
		}

		let values: Vec<Value> = builder.build_query_scalar().fetch_all(&self.db.pool).await?;

		values
			.into_iter()
			.map(|value| match value {
				Value::Object(row) => Ok(row),
				other => Err(Error::Decode(format!("expected a JSON object, got {other}"))),
			})
			.collect()
	}

	async fn count_rows(&self, filter: &QueryFilter) -> Result<u64> {
		let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM ");

		push_filter(&mut builder, filter);

		let count: i64 = builder.build_query_scalar().fetch_one(&self.db.pool).await?;

		Ok(u64::try_from(count).unwrap_or_default())
	}
}
impl QueryExecutor for PgExecutor {
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		Box::pin(async move { self.select_rows(request).await })
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { self.count_rows(filter).await })
	}
}
impl RecordStore for PgExecutor {
	fn engagement_score<'a>(
		&'a self,
		organization_id: Uuid,
		contact_id: Uuid,
	) -> BoxFuture<'a, Result<Option<i32>>> {
		Box::pin(async move {
			let sql = format!(
				"SELECT engagement_score FROM {CONTACTS_TABLE} WHERE {TENANT_FIELD} = $1 AND {ID_FIELD} = $2"
			);
			let score: Option<Option<i32>> = sqlx::query_scalar(&sql)
				.bind(organization_id)
				.bind(contact_id)
				.fetch_optional(&self.db.pool)
				.await?;

			Ok(score.flatten())
		})
	}

	fn set_task_priority<'a>(
		&'a self,
		organization_id: Uuid,
		task_id: Uuid,
		priority: i32,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let sql = format!(
				"\
UPDATE {TASKS_TABLE}
SET priority = $1, updated_at = now()
WHERE {TENANT_FIELD} = $2 AND {ID_FIELD} = $3"
			);
			let result = sqlx::query(&sql)
				.bind(priority)
				.bind(organization_id)
				.bind(task_id)
				.execute(&self.db.pool)
				.await?;

			if result.rows_affected() == 0 {
				return Err(Error::NotFound(format!("task {task_id}")));
			}

			Ok(())
		})
	}
}
impl ProfileDirectory for PgExecutor {
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>> {
		Box::pin(async move {
			let sql = format!("SELECT {TENANT_FIELD} FROM {PROFILES_TABLE} WHERE user_id = $1");
			let organization_id = sqlx::query_scalar(&sql)
				.bind(user_id)
				.fetch_optional(&self.db.pool)
				.await?;

			Ok(organization_id)
		})
	}
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &QueryFilter) {
	builder.push(filter.table);
	builder.push(" AS t WHERE t.");
	builder.push(TENANT_FIELD);
	builder.push(" = ");
	builder.push_bind(filter.organization_id);

	for constraint in &filter.constraints {
		builder.push(" AND ");
		push_constraint(builder, constraint);
	}
}

fn push_constraint(builder: &mut QueryBuilder<'_, Postgres>, constraint: &Constraint) {
	match constraint {
		Constraint::EqualsOneOf { field, values } => {
			if values.is_empty() {
				builder.push("FALSE");

				return;
			}

			builder.push("t.");
			builder.push(*field);
			builder.push(" IN (");

			for (idx, value) in values.iter().enumerate() {
				if idx > 0 {
					builder.push(", ");
				}

				push_value(builder, value);
			}

			builder.push(")");
		},
		Constraint::ArrayOverlaps { field, values } => {
			builder.push("t.");
			builder.push(*field);
			builder.push(" && ");
			builder.push_bind(values.clone());
		},
		Constraint::NumericRange { field, ranges } => {
			if ranges.is_empty() {
				builder.push("FALSE");

				return;
			}

			builder.push("(");

			for (idx, range) in ranges.iter().enumerate() {
				if idx > 0 {
					builder.push(" OR ");
				}

				builder.push("(t.");
				builder.push(*field);
				builder.push(" >= ");
				builder.push_bind(range.min);
				builder.push(" AND t.");
				builder.push(*field);
				builder.push(" <= ");
				builder.push_bind(range.max);
				builder.push(")");
			}

			builder.push(")");
		},
		Constraint::BooleanEquals { field, value } => {
			builder.push("t.");
			builder.push(*field);
			builder.push(" = ");
			builder.push_bind(*value);
		},
		Constraint::TextMatch { fields, term } => {
			if fields.is_empty() {
				builder.push("TRUE");

				return;
			}

			let pattern = format!("%{}%", escape_like(term));

			builder.push("(");

			for (idx, field) in fields.iter().enumerate() {
				if idx > 0 {
					builder.push(" OR ");
				}

				builder.push("t.");
				builder.push(*field);
				builder.push(" ILIKE ");
				builder.push_bind(pattern.clone());
			}

			builder.push(")");
		},
	}
}

fn push_cursor(
	builder: &mut QueryBuilder<'_, Postgres>,
	order: OrderBy,
	cursor: &Cursor,
) -> Result<()> {
	if cursor.value.is_null() {
		return Err(Error::InvalidArgument("cursor sort value must not be null".to_string()));
	}

	let comparison = match order.direction {
		SortDirection::Asc => " > ",
		SortDirection::Desc => " < ",
	};

	builder.push(" AND (t.");
	builder.push(order.field);
	builder.push(", t.");
	builder.push(ID_FIELD);
	builder.push(")");
	builder.push(comparison);
	builder.push("(");
	push_value(builder, &cursor.value);
	builder.push(", ");
	builder.push_bind(cursor.id);
	builder.push(")");

	Ok(())
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, order: OrderBy) {
	let direction = order.direction.as_sql();

	builder.push(" ORDER BY t.");
	builder.push(order.field);
	builder.push(" ");
	builder.push(direction);
	builder.push(", t.");
	builder.push(ID_FIELD);
	builder.push(" ");
	builder.push(direction);
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &FieldValue) {
	match value {
		FieldValue::Null => {
			builder.push("NULL");
		},
		FieldValue::Bool(value) => {
			builder.push_bind(*value);
		},
		FieldValue::Integer(value) => {
			builder.push_bind(*value);
		},
		FieldValue::Float(value) => {
			builder.push_bind(*value);
		},
		FieldValue::Text(value) => {
			builder.push_bind(value.clone());
		},
		FieldValue::Timestamp(value) => {
			builder.push_bind(*value);
		},
		FieldValue::Uuid(value) => {
			builder.push_bind(*value);
		},
	}
}

fn escape_like(term: &str) -> String {
	let mut out = String::with_capacity(term.len());

	for ch in term.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

#[cfg(test)]
mod tests {
	use sqlx::{Execute, Postgres, QueryBuilder};
	use uuid::Uuid;

	use crate::{
		postgres,
		query::{
			Constraint, Cursor, NumericRange, OrderBy, QueryFilter, SortDirection,
		},
		value::FieldValue,
	};

	fn render(filter: &QueryFilter) -> String {
		let mut builder = QueryBuilder::<Postgres>::new("SELECT to_jsonb(t) AS row FROM ");

		postgres::push_filter(&mut builder, filter);

		builder.build().sql().to_string()
	}

	#[test]
	fn like_wildcards_are_escaped() {
		assert_eq!(postgres::escape_like("50%_off\\"), "50\\%\\_off\\\\");
	}

	#[test]
	fn constraints_render_as_bound_predicates() {
		let filter = QueryFilter {
			table: "candidates",
			organization_id: Uuid::nil(),
			constraints: vec![
				Constraint::EqualsOneOf {
					field: "stage",
					values: vec![
						FieldValue::Text("screen".to_string()),
						FieldValue::Text("offer".to_string()),
					],
				},
				Constraint::NumericRange {
					field: "engagement_score",
					ranges: vec![NumericRange { min: 8.0, max: 10.0 }],
				},
				Constraint::TextMatch {
					fields: vec!["full_name", "email"],
					term: "jo".to_string(),
				},
			],
		};
		let sql = render(&filter);

		assert_eq!(
			sql,
			"SELECT to_jsonb(t) AS row FROM candidates AS t WHERE t.organization_id = $1 \
			 AND t.stage IN ($2, $3) \
			 AND ((t.engagement_score >= $4 AND t.engagement_score <= $5)) \
			 AND (t.full_name ILIKE $6 OR t.email ILIKE $7)"
		);
	}

	#[test]
	fn empty_discrete_set_matches_nothing() {
		let filter = QueryFilter {
			table: "tasks",
			organization_id: Uuid::nil(),
			constraints: vec![Constraint::EqualsOneOf { field: "status", values: Vec::new() }],
		};

		assert!(render(&filter).ends_with("AND FALSE"));
	}

	#[test]
	fn cursor_uses_row_comparison_in_sort_direction() {
		let mut builder = QueryBuilder::<Postgres>::new("");
		let cursor = Cursor { value: FieldValue::Integer(3), id: Uuid::nil() };
		let order = OrderBy { field: "priority", direction: SortDirection::Desc };

		postgres::push_cursor(&mut builder, order, &cursor).expect("Cursor must render.");
		postgres::push_order(&mut builder, order);

		assert_eq!(
			builder.build().sql(),
			" AND (t.priority, t.id) < ($1, $2) ORDER BY t.priority DESC, t.id DESC"
		);
	}
}
