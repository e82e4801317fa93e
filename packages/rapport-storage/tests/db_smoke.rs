use uuid::Uuid;

use rapport_storage::{
	Constraint, NumericRange, OrderBy, PageStart, ProfileDirectory, QueryExecutor, QueryFilter,
	QueryRequest, RecordStore, SortDirection, models::TASKS_TABLE,
};
use rapport_testkit::{TestDatabase, fixtures};

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set RAPPORT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let executor = test_db.executor().await.expect("Failed to bootstrap test database.");

	executor.db.ensure_schema().await.expect("Second bootstrap must succeed.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name IN ('contacts', 'candidates', 'tasks', 'events', 'profiles', 'organizations')",
	)
	.fetch_one(&executor.db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 6);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn cursor_pages_cover_every_row_once() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!("Skipping cursor_pages_cover_every_row_once; set RAPPORT_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let executor = test_db.executor().await.expect("Failed to bootstrap test database.");

	fixtures::seed_postgres(&executor.db.pool, 17).await.expect("Failed to seed rows.");

	let filter = QueryFilter {
		table: "contacts",
		organization_id: fixtures::organization_id(),
		constraints: Vec::new(),
	};
	let order = OrderBy { field: "created_at", direction: SortDirection::Desc };
	let full = executor
		.run_query(&QueryRequest {
			filter: filter.clone(),
			order,
			start: PageStart::After(None),
			limit: 100,
		})
		.await
		.expect("Full query must succeed.");
	let mut paged = Vec::new();
	let mut cursor = None;

	loop {
		let rows = executor
			.run_query(&QueryRequest {
				filter: filter.clone(),
				order,
				start: PageStart::After(cursor.clone()),
				limit: 4,
			})
			.await
			.expect("Page query must succeed.");
		let Some(last) = rows.last() else {
			break;
		};

		cursor = Some(rapport_storage::Cursor {
			value: rapport_storage::FieldValue::from_json(
				rapport_storage::FieldKind::Timestamp,
				&last["created_at"],
			)
			.expect("created_at must decode."),
			id: Uuid::parse_str(last["id"].as_str().expect("id must be a string."))
				.expect("id must be a uuid."),
		});

		paged.extend(rows);
	}

	assert_eq!(full.len(), 17);
	assert_eq!(paged, full);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RAPPORT_PG_DSN to run."]
async fn constraints_profiles_and_priority_writes_round_trip() {
	let Some(base_dsn) = rapport_testkit::env_dsn() else {
		eprintln!(
			"Skipping constraints_profiles_and_priority_writes_round_trip; set RAPPORT_PG_DSN to run."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let executor = test_db.executor().await.expect("Failed to bootstrap test database.");
	let org = fixtures::organization_id();

	fixtures::seed_postgres(&executor.db.pool, 20).await.expect("Failed to seed rows.");

	let high = executor
		.count(&QueryFilter {
			table: "contacts",
			organization_id: org,
			constraints: vec![Constraint::NumericRange {
				field: "engagement_score",
				ranges: vec![NumericRange { min: 8.0, max: 10.0 }],
			}],
		})
		.await
		.expect("Count must succeed.");

	// Scores 8 and 9 appear twice each in twenty rows. Score 10 is never assigned.
	assert_eq!(high, 4);
	assert_eq!(
		executor.organization_for_user(fixtures::user_id()).await.expect("Lookup must succeed."),
		Some(org)
	);
	assert_eq!(
		executor
			.engagement_score(org, fixtures::contact_id(2))
			.await
			.expect("Lookup must succeed."),
		Some(3)
	);

	executor
		.set_task_priority(org, fixtures::task_id(0), 4)
		.await
		.expect("Priority write must succeed.");

	let priority: i32 = sqlx::query_scalar(&format!("SELECT priority FROM {TASKS_TABLE} WHERE id = $1"))
		.bind(fixtures::task_id(0))
		.fetch_one(&executor.db.pool)
		.await
		.expect("Failed to read priority.");

	assert_eq!(priority, 4);
	assert!(matches!(
		executor.set_task_priority(fixtures::other_organization_id(), fixtures::task_id(0), 1).await,
		Err(rapport_storage::Error::NotFound(_))
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
