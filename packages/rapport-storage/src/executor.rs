use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use crate::{
	Result,
	query::{QueryFilter, QueryRequest, Row},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runs filtered, ordered reads against one tenant-scoped table.
pub trait QueryExecutor
where
	Self: Send + Sync,
{
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>>;

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>>;
}

/// Point reads and writes used by priority scoring.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// `Ok(None)` when the contact is missing or has no score.
	fn engagement_score<'a>(
		&'a self,
		organization_id: Uuid,
		contact_id: Uuid,
	) -> BoxFuture<'a, Result<Option<i32>>>;

	/// Fails with [`crate::Error::NotFound`] when the task does not exist in the organization.
	fn set_task_priority<'a>(
		&'a self,
		organization_id: Uuid,
		task_id: Uuid,
		priority: i32,
	) -> BoxFuture<'a, Result<()>>;
}

/// Maps an acting user to the organization their queries are scoped to.
pub trait ProfileDirectory
where
	Self: Send + Sync,
{
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>>;
}

impl<T> QueryExecutor for Arc<T>
where
	T: QueryExecutor + ?Sized,
{
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		(**self).run_query(request)
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		(**self).count(filter)
	}
}

impl<T> RecordStore for Arc<T>
where
	T: RecordStore + ?Sized,
{
	fn engagement_score<'a>(
		&'a self,
		organization_id: Uuid,
		contact_id: Uuid,
	) -> BoxFuture<'a, Result<Option<i32>>> {
		(**self).engagement_score(organization_id, contact_id)
	}

	fn set_task_priority<'a>(
		&'a self,
		organization_id: Uuid,
		task_id: Uuid,
		priority: i32,
	) -> BoxFuture<'a, Result<()>> {
		(**self).set_task_priority(organization_id, task_id, priority)
	}
}

impl<T> ProfileDirectory for Arc<T>
where
	T: ProfileDirectory + ?Sized,
{
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>> {
		(**self).organization_for_user(user_id)
	}
}
