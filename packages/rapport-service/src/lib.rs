pub mod debounce;
pub mod entity;
pub mod filter;
pub mod generation;
pub mod paginate;
pub mod priority;
pub mod session;
pub mod sort;
pub mod tenant;

mod error;

pub use debounce::DebouncedSearch;
pub use entity::{EntitySchema, FacetMode, FacetSpec, FeedEntity, SortSpec, schema_for};
pub use error::{Error, Result};
pub use filter::{CompiledFilter, FilterState, SkipReason, SkippedInput};
pub use generation::{Generations, Ticket};
pub use paginate::{CursorPaginator, Page, PageSizePolicy, QuerySpec};
pub use session::{FetchOutcome, ListSession, ListSnapshot};
pub use sort::SortConfig;

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use rapport_config::{Config, Feed, Tenant};
use rapport_domain::{ImportanceEntry, NEUTRAL_ENGAGEMENT, PriorityCalculation, catalog};
use rapport_storage::{Cursor, ProfileDirectory, QueryExecutor, RecordStore};

/// Storage seams the service runs against.
#[derive(Clone)]
pub struct Collaborators {
	pub executor: Arc<dyn QueryExecutor>,
	pub records: Arc<dyn RecordStore>,
	pub profiles: Arc<dyn ProfileDirectory>,
}
impl Collaborators {
	/// Uses one store for every seam.
	pub fn shared<S>(store: Arc<S>) -> Self
	where
		S: QueryExecutor + RecordStore + ProfileDirectory + 'static,
	{
		Self { executor: store.clone(), records: store.clone(), profiles: store }
	}
}

pub struct FeedService {
	pub feed: Feed,
	pub tenant: Tenant,
	pub collaborators: Collaborators,
}
impl FeedService {
	pub fn new(cfg: &Config, collaborators: Collaborators) -> Self {
		Self::with_settings(cfg.feed.clone(), cfg.tenant.clone(), collaborators)
	}

	pub fn with_settings(feed: Feed, tenant: Tenant, collaborators: Collaborators) -> Self {
		Self { feed, tenant, collaborators }
	}

	pub async fn resolve_organization(&self, user_id: Uuid) -> Result<Uuid> {
		tenant::resolve_organization(self.collaborators.profiles.as_ref(), user_id, &self.tenant)
			.await
	}

	pub fn paginator(&self, schema: &'static EntitySchema) -> CursorPaginator {
		CursorPaginator::new(
			self.collaborators.executor.clone(),
			schema,
			PageSizePolicy::from(&self.feed),
		)
	}

	/// Opens an idle list session scoped to the user's organization.
	pub async fn open_session<E>(&self, user_id: Uuid) -> Result<ListSession<E>>
	where
		E: FeedEntity,
	{
		let organization_id = self.resolve_organization(user_id).await?;

		Ok(ListSession::new(
			self.paginator(E::schema()),
			organization_id,
			Duration::from_millis(self.feed.search_debounce_ms),
		))
	}

	/// Stateless cursor page for the entity named `entity`.
	pub async fn fetch_page(
		&self,
		user_id: Uuid,
		entity: &str,
		spec: &QuerySpec,
		cursor: Option<Cursor>,
		page_size: u32,
	) -> Result<Page> {
		let schema = require_schema(entity)?;
		let organization_id = self.resolve_organization(user_id).await?;

		self.paginator(schema).fetch_page(organization_id, spec, cursor, page_size).await
	}

	/// Stateless offset page with a total count.
	pub async fn fetch_offset_page(
		&self,
		user_id: Uuid,
		entity: &str,
		spec: &QuerySpec,
		offset: u64,
		page_size: u32,
	) -> Result<Page> {
		let schema = require_schema(entity)?;
		let organization_id = self.resolve_organization(user_id).await?;

		self.paginator(schema).fetch_offset_page(organization_id, spec, offset, page_size).await
	}

	/// Pure scoring. A missing engagement score uses the neutral default.
	pub fn calculate_priority(
		&self,
		engagement_score: Option<u8>,
		activity_type: &str,
	) -> PriorityCalculation {
		rapport_domain::calculate_priority(
			engagement_score.unwrap_or(NEUTRAL_ENGAGEMENT),
			activity_type,
		)
	}

	pub fn importance_catalog(&self) -> Vec<ImportanceEntry> {
		catalog::entries_by_weight()
	}

	/// Scores an activity against the contact's stored engagement.
	pub async fn score_contact_activity(
		&self,
		user_id: Uuid,
		contact_id: Uuid,
		activity_type: &str,
	) -> Result<PriorityCalculation> {
		let organization_id = self.resolve_organization(user_id).await?;
		let engagement = priority::engagement_or_neutral(
			self.collaborators.records.as_ref(),
			organization_id,
			contact_id,
		)
		.await;

		Ok(rapport_domain::calculate_priority(engagement, activity_type))
	}

	/// Scores the activity and stores the resulting level on the task.
	pub async fn prioritize_task(
		&self,
		user_id: Uuid,
		task_id: Uuid,
		contact_id: Uuid,
		activity_type: &str,
	) -> Result<PriorityCalculation> {
		let organization_id = self.resolve_organization(user_id).await?;
		let engagement = priority::engagement_or_neutral(
			self.collaborators.records.as_ref(),
			organization_id,
			contact_id,
		)
		.await;
		let calculation = rapport_domain::calculate_priority(engagement, activity_type);

		self.collaborators
			.records
			.set_task_priority(
				organization_id,
				task_id,
				i32::from(calculation.priority_level.value()),
			)
			.await?;

		tracing::info!(
			%task_id,
			priority = calculation.priority_level.value(),
			score = calculation.calculated_score,
			"Task priority updated."
		);

		Ok(calculation)
	}
}

fn require_schema(entity: &str) -> Result<&'static EntitySchema> {
	schema_for(entity)
		.ok_or_else(|| Error::InvalidRequest { message: format!("Unknown entity {entity:?}.") })
}
