use std::sync::Arc;

use uuid::Uuid;

use rapport_config::{Feed, Tenant};
use rapport_domain::PriorityLevel;
use rapport_service::{Collaborators, Error, FeedService};
use rapport_storage::{memory::MemoryExecutor, models::TASKS_TABLE};
use rapport_testkit::{
	executors::{CountingDirectory, FaultyExecutor},
	fixtures,
};

fn seeded(count: u32) -> Arc<MemoryExecutor> {
	let memory = MemoryExecutor::new();

	fixtures::seed_memory(&memory, count).expect("Failed to seed memory store.");

	Arc::new(memory)
}

fn tenant(resolve_attempts: u32) -> Tenant {
	Tenant { resolve_attempts, resolve_backoff_ms: 1 }
}

fn service(memory: Arc<MemoryExecutor>) -> FeedService {
	FeedService::with_settings(Feed::default(), tenant(3), Collaborators::shared(memory))
}

#[test]
fn catalog_is_sorted_heaviest_first() {
	let service = service(Arc::new(MemoryExecutor::new()));
	let catalog = service.importance_catalog();

	assert!(!catalog.is_empty());
	assert!(catalog.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
	assert_eq!(catalog.last().map(|entry| entry.weight), Some(2));
}

#[test]
fn missing_engagement_uses_neutral_score() {
	let service = service(Arc::new(MemoryExecutor::new()));
	let result = service.calculate_priority(None, "interview");

	assert_eq!(result.engagement_score, 5);
	assert_eq!(result.calculated_score, 50);
	assert_eq!(result.priority_level, PriorityLevel::Medium);
}

#[tokio::test]
async fn stored_engagement_drives_score() {
	let service = service(seeded(10));
	// Contact 8 has engagement 9.
	let result = service
		.score_contact_activity(fixtures::user_id(), fixtures::contact_id(8), "interview")
		.await
		.expect("Scoring must succeed.");

	assert_eq!(result.engagement_score, 9);
	assert_eq!(result.calculated_score, 90);
	assert_eq!(result.priority_level, PriorityLevel::Critical);
}

#[tokio::test]
async fn unscored_missing_or_failing_lookups_degrade_to_neutral() {
	let memory = seeded(10);
	let service = service(memory.clone());

	// Contact 4 has no stored score.
	for contact_id in [fixtures::contact_id(4), Uuid::from_u128(1)] {
		let result = service
			.score_contact_activity(fixtures::user_id(), contact_id, "meeting")
			.await
			.expect("Scoring must succeed.");

		assert_eq!(result.engagement_score, 5);
		assert_eq!(result.calculated_score, 30);
	}

	let faulty = Arc::new(FaultyExecutor::new(memory.clone()));
	let service = FeedService::with_settings(
		Feed::default(),
		tenant(3),
		Collaborators { executor: memory.clone(), records: faulty.clone(), profiles: memory },
	);

	faulty.fail_next(1);

	let result = service
		.score_contact_activity(fixtures::user_id(), fixtures::contact_id(8), "interview")
		.await
		.expect("Lookup failure must not surface.");

	assert_eq!(result.engagement_score, 5);
}

#[tokio::test]
async fn prioritize_task_writes_level() {
	let memory = seeded(10);
	let service = service(memory.clone());
	let result = service
		.prioritize_task(
			fixtures::user_id(),
			fixtures::task_id(3),
			fixtures::contact_id(8),
			"job-offer",
		)
		.await
		.expect("Prioritization must succeed.");
	let row = memory
		.get(TASKS_TABLE, fixtures::task_id(3))
		.expect("Read must succeed.")
		.expect("Task must exist.");

	assert_eq!(result.priority_level, PriorityLevel::Critical);
	assert_eq!(row["priority"], 4);
}

#[tokio::test]
async fn prioritizing_a_missing_task_is_not_found() {
	let service = service(seeded(2));
	let err = service
		.prioritize_task(fixtures::user_id(), Uuid::from_u128(7), fixtures::contact_id(1), "email")
		.await
		.expect_err("Missing task must fail.");

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn tenant_lookup_retries_transient_failures() {
	let memory = seeded(1);
	let faulty = Arc::new(FaultyExecutor::new(memory.clone()));
	let directory = Arc::new(CountingDirectory::new(faulty.clone()));
	let service = FeedService::with_settings(
		Feed::default(),
		tenant(3),
		Collaborators { executor: memory.clone(), records: memory, profiles: directory.clone() },
	);

	faulty.fail_next(2);

	assert_eq!(
		service.resolve_organization(fixtures::user_id()).await,
		Ok(fixtures::organization_id())
	);
	assert_eq!(directory.calls(), 3);

	faulty.fail_next(5);

	let err = service
		.resolve_organization(fixtures::user_id())
		.await
		.expect_err("Exhausted retries must fail.");

	assert!(matches!(err, Error::TenantResolution { .. }));
	assert_eq!(directory.calls(), 6);
}

#[tokio::test]
async fn unknown_user_fails_without_retry_or_partial_rows() {
	let memory = seeded(3);
	let directory = Arc::new(CountingDirectory::new(memory.clone()));
	let service = FeedService::with_settings(
		Feed::default(),
		tenant(3),
		Collaborators { executor: memory.clone(), records: memory, profiles: directory.clone() },
	);
	let err = service
		.fetch_page(Uuid::from_u128(42), "contacts", &Default::default(), None, 5)
		.await
		.expect_err("Unknown user must fail.");

	assert!(matches!(err, Error::TenantResolution { .. }));
	assert_eq!(directory.calls(), 1);
}
