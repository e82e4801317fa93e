use std::sync::Arc;

use rapport_service::{Collaborators, FeedService};
use rapport_storage::{db::Db, postgres::PgExecutor};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FeedService>,
}
impl AppState {
	pub async fn new(config: rapport_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let executor = Arc::new(PgExecutor::new(db));
		let service = FeedService::new(&config, Collaborators::shared(executor));

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: FeedService) -> Self {
		Self { service: Arc::new(service) }
	}
}
