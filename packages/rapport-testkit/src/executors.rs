//! Executor wrappers that observe or perturb calls into an inner executor.

use std::{
	collections::VecDeque,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use tokio::sync::{oneshot, watch};
use uuid::Uuid;

use rapport_storage::{
	BoxFuture, Error, ProfileDirectory, QueryExecutor, QueryFilter, QueryRequest, RecordStore,
	Result, Row,
};

/// Counts calls and records every request it forwards.
pub struct SpyExecutor<E> {
	inner: E,
	queries: AtomicUsize,
	counts: AtomicUsize,
	requests: Mutex<Vec<QueryRequest>>,
}
impl<E> SpyExecutor<E> {
	pub fn new(inner: E) -> Self {
		Self {
			inner,
			queries: AtomicUsize::new(0),
			counts: AtomicUsize::new(0),
			requests: Mutex::new(Vec::new()),
		}
	}

	pub fn inner(&self) -> &E {
		&self.inner
	}

	pub fn queries(&self) -> usize {
		self.queries.load(Ordering::SeqCst)
	}

	pub fn counts(&self) -> usize {
		self.counts.load(Ordering::SeqCst)
	}

	pub fn requests(&self) -> Vec<QueryRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl<E> QueryExecutor for SpyExecutor<E>
where
	E: QueryExecutor,
{
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		self.queries.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		self.inner.run_query(request)
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		self.counts.fetch_add(1, Ordering::SeqCst);

		self.inner.count(filter)
	}
}

/// Holds queries at gates the test opens explicitly, in call order.
///
/// Each [`GatedExecutor::gate`] call arms one gate. The next query takes the oldest armed gate
/// and waits until its sender fires or is dropped. Queries arriving with no armed gate pass
/// straight through.
pub struct GatedExecutor<E> {
	inner: E,
	gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
	calls: watch::Sender<usize>,
}
impl<E> GatedExecutor<E> {
	pub fn new(inner: E) -> Self {
		Self { inner, gates: Mutex::new(VecDeque::new()), calls: watch::Sender::new(0) }
	}

	pub fn gate(&self) -> oneshot::Sender<()> {
		let (tx, rx) = oneshot::channel();

		self.gates.lock().unwrap_or_else(|err| err.into_inner()).push_back(rx);

		tx
	}

	/// Resolves once at least `n` queries have entered the executor.
	pub async fn wait_for_calls(&self, n: usize) {
		let mut rx = self.calls.subscribe();
		let _ = rx.wait_for(|calls| *calls >= n).await;
	}
}
impl<E> QueryExecutor for GatedExecutor<E>
where
	E: QueryExecutor,
{
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		Box::pin(async move {
			let gate = self.gates.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

			self.calls.send_modify(|calls| *calls += 1);

			if let Some(gate) = gate {
				let _ = gate.await;
			}

			self.inner.run_query(request).await
		})
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		self.inner.count(filter)
	}
}

/// Fails the next `n` calls with [`Error::Unavailable`], then delegates.
pub struct FaultyExecutor<E> {
	inner: E,
	failures: AtomicUsize,
}
impl<E> FaultyExecutor<E> {
	pub fn new(inner: E) -> Self {
		Self { inner, failures: AtomicUsize::new(0) }
	}

	pub fn inner(&self) -> &E {
		&self.inner
	}

	pub fn fail_next(&self, n: usize) {
		self.failures.store(n, Ordering::SeqCst);
	}

	fn take_failure(&self) -> Result<()> {
		let injected = self
			.failures
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
			.is_ok();

		if injected {
			return Err(Error::Unavailable("injected failure".to_string()));
		}

		Ok(())
	}
}
impl<E> QueryExecutor for FaultyExecutor<E>
where
	E: QueryExecutor,
{
	fn run_query<'a>(&'a self, request: &'a QueryRequest) -> BoxFuture<'a, Result<Vec<Row>>> {
		Box::pin(async move {
			self.take_failure()?;

			self.inner.run_query(request).await
		})
	}

	fn count<'a>(&'a self, filter: &'a QueryFilter) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			self.take_failure()?;

			self.inner.count(filter).await
		})
	}
}
impl<E> RecordStore for FaultyExecutor<E>
where
	E: RecordStore,
{
	fn engagement_score<'a>(
		&'a self,
		organization_id: Uuid,
		contact_id: Uuid,
	) -> BoxFuture<'a, Result<Option<i32>>> {
		Box::pin(async move {
			self.take_failure()?;

			self.inner.engagement_score(organization_id, contact_id).await
		})
	}

	fn set_task_priority<'a>(
		&'a self,
		organization_id: Uuid,
		task_id: Uuid,
		priority: i32,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.take_failure()?;

			self.inner.set_task_priority(organization_id, task_id, priority).await
		})
	}
}
impl<E> ProfileDirectory for FaultyExecutor<E>
where
	E: ProfileDirectory,
{
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>> {
		Box::pin(async move {
			self.take_failure()?;

			self.inner.organization_for_user(user_id).await
		})
	}
}

/// Counts profile lookups on top of any directory.
pub struct CountingDirectory<D> {
	inner: D,
	calls: AtomicUsize,
}
impl<D> CountingDirectory<D> {
	pub fn new(inner: D) -> Self {
		Self { inner, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl<D> ProfileDirectory for CountingDirectory<D>
where
	D: ProfileDirectory,
{
	fn organization_for_user<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Option<Uuid>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		self.inner.organization_for_user(user_id)
	}
}
