//! Incremental list aggregation for one list view.
//!
//! A [`ListSession`] owns the accumulated rows, the active cursor and one [`Generations`]
//! counter. Every change to filters, sort or committed search starts a new generation and a
//! fresh first page. Results from older generations are dropped without touching state.

use std::{
	sync::{Arc, Mutex, MutexGuard, Weak},
	time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use rapport_storage::Cursor;

use crate::{
	Error, Result,
	debounce::DebouncedSearch,
	entity::FeedEntity,
	filter::{FilterState, SkippedInput},
	generation::{Generations, Ticket},
	paginate::{self, CursorPaginator, QuerySpec},
	sort::SortConfig,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
	Applied { rows: usize },
	/// Nothing was requested: no further page, or a fetch is already in flight.
	Skipped,
	/// A newer generation replaced this fetch. Its result was discarded.
	Superseded,
}

/// Point-in-time view of a session for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ListSnapshot<E> {
	pub items: Vec<E>,
	pub has_more: bool,
	pub loading: bool,
	pub is_fetching_more: bool,
	pub is_searching: bool,
	pub error: Option<Error>,
	/// Unavailable with cursor pagination.
	pub total_count: Option<u64>,
	pub search_text: String,
	pub committed_search: String,
	pub skipped: Vec<SkippedInput>,
}

pub struct ListSession<E> {
	inner: Arc<Inner<E>>,
}
impl<E> Clone for ListSession<E> {
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}
impl<E> ListSession<E>
where
	E: FeedEntity,
{
	/// Creates an idle session. Must be called inside a Tokio runtime.
	///
	/// Every committed search value refreshes the session until the last clone is dropped.
	pub fn new(paginator: CursorPaginator, organization_id: Uuid, debounce: Duration) -> Self {
		let inner = Arc::new_cyclic(|weak| {
			let search = DebouncedSearch::spawn(debounce);
			let driver = drive_search(weak.clone(), search.subscribe());

			Inner {
				paginator,
				organization_id,
				generations: Generations::new(),
				search,
				driver,
				state: Mutex::new(State::default()),
			}
		});

		Self { inner }
	}

	pub fn organization_id(&self) -> Uuid {
		self.inner.organization_id
	}

	pub fn generation(&self) -> u64 {
		self.inner.generations.current()
	}

	/// Clears the accumulation and fetches the first page for the current query.
	pub async fn refresh(&self) -> Result<FetchOutcome> {
		let (ticket, spec) = {
			let mut state = self.state();
			let ticket = self.inner.generations.advance();

			state.items.clear();
			state.cursor = None;
			state.has_more = false;
			state.loading = true;
			state.is_fetching_more = false;
			state.error = None;

			(ticket, state.spec.clone())
		};
		let result = self.fetch(&ticket, &spec, None).await;
		let mut state = self.state();

		if is_stale(&ticket, &result) {
			return Ok(FetchOutcome::Superseded);
		}

		state.loading = false;

		match result {
			Ok(fetched) => {
				let rows = fetched.items.len();

				state.items = fetched.items;
				state.apply(fetched.has_more, fetched.next_cursor, fetched.skipped);

				Ok(FetchOutcome::Applied { rows })
			},
			Err(err) => {
				state.error = Some(err.clone());

				Err(err)
			},
		}
	}

	/// Appends the next page. A no-op when there is no further page or a fetch is pending.
	pub async fn load_more(&self) -> Result<FetchOutcome> {
		let (ticket, spec, cursor) = {
			let mut state = self.state();

			if !state.has_more || state.loading || state.is_fetching_more {
				return Ok(FetchOutcome::Skipped);
			}

			state.is_fetching_more = true;

			(self.inner.generations.ticket(), state.spec.clone(), state.cursor.clone())
		};
		let result = self.fetch(&ticket, &spec, cursor).await;
		let mut state = self.state();

		if is_stale(&ticket, &result) {
			return Ok(FetchOutcome::Superseded);
		}

		state.is_fetching_more = false;

		match result {
			Ok(fetched) => {
				let rows = fetched.items.len();

				state.items.extend(fetched.items);
				state.apply(fetched.has_more, fetched.next_cursor, fetched.skipped);

				Ok(FetchOutcome::Applied { rows })
			},
			Err(err) => {
				state.error = Some(err.clone());

				Err(err)
			},
		}
	}

	/// Re-runs the step that failed: the first page when nothing is loaded, else the next page.
	pub async fn retry(&self) -> Result<FetchOutcome> {
		let (failed, empty) = {
			let state = self.state();

			(state.error.is_some(), state.items.is_empty())
		};

		if !failed {
			return Ok(FetchOutcome::Skipped);
		}
		if empty { self.refresh().await } else { self.load_more().await }
	}

	pub async fn set_filters(&self, filters: FilterState) -> Result<FetchOutcome> {
		self.state().spec.filters = filters;

		self.refresh().await
	}

	pub async fn set_sort(&self, sort: Option<SortConfig>) -> Result<FetchOutcome> {
		self.state().spec.sort = sort;

		self.refresh().await
	}

	/// Echoes a keystroke. The query changes only once the debounced value commits.
	pub fn set_search_text(&self, raw: &str) {
		self.inner.search.set_raw(raw);
	}

	pub fn snapshot(&self) -> ListSnapshot<E>
	where
		E: Clone,
	{
		let state = self.state();

		ListSnapshot {
			items: state.items.clone(),
			has_more: state.has_more,
			loading: state.loading,
			is_fetching_more: state.is_fetching_more,
			is_searching: self.inner.search.is_searching(),
			error: state.error.clone(),
			total_count: None,
			search_text: self.inner.search.raw(),
			committed_search: state.spec.search.clone().unwrap_or_default(),
			skipped: state.skipped.clone(),
		}
	}

	async fn apply_committed_search(&self, committed: String) -> Result<FetchOutcome> {
		self.state().spec.search = Some(committed).filter(|term| !term.trim().is_empty());

		self.refresh().await
	}

	async fn fetch(
		&self,
		ticket: &Ticket,
		spec: &QuerySpec,
		cursor: Option<Cursor>,
	) -> Result<Fetched<E>> {
		let paginator = &self.inner.paginator;
		let page_size = paginator.page_size(0);
		let page = ticket
			.run(paginator.fetch_page(self.inner.organization_id, spec, cursor, page_size))
			.await??;
		let items = paginate::decode_rows(page.rows)?;

		Ok(Fetched {
			items,
			has_more: page.has_more,
			next_cursor: page.next_cursor,
			skipped: page.skipped,
		})
	}

	fn state(&self) -> MutexGuard<'_, State<E>> {
		self.inner.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

struct Inner<E> {
	paginator: CursorPaginator,
	organization_id: Uuid,
	generations: Generations,
	search: DebouncedSearch,
	driver: JoinHandle<()>,
	state: Mutex<State<E>>,
}
impl<E> Drop for Inner<E> {
	fn drop(&mut self) {
		self.driver.abort();
	}
}

struct State<E> {
	spec: QuerySpec,
	items: Vec<E>,
	cursor: Option<Cursor>,
	has_more: bool,
	loading: bool,
	is_fetching_more: bool,
	error: Option<Error>,
	skipped: Vec<SkippedInput>,
}
impl<E> State<E> {
	fn apply(&mut self, has_more: bool, cursor: Option<Cursor>, skipped: Vec<SkippedInput>) {
		self.has_more = has_more;
		self.cursor = cursor;
		self.skipped = skipped;
		self.error = None;
	}
}
impl<E> Default for State<E> {
	fn default() -> Self {
		Self {
			spec: QuerySpec::default(),
			items: Vec::new(),
			cursor: None,
			has_more: false,
			loading: false,
			is_fetching_more: false,
			error: None,
			skipped: Vec::new(),
		}
	}
}

struct Fetched<E> {
	items: Vec<E>,
	has_more: bool,
	next_cursor: Option<Cursor>,
	skipped: Vec<SkippedInput>,
}

fn drive_search<E>(weak: Weak<Inner<E>>, mut commits: watch::Receiver<String>) -> JoinHandle<()>
where
	E: FeedEntity,
{
	tokio::spawn(async move {
		while commits.changed().await.is_ok() {
			let committed = commits.borrow_and_update().clone();
			let Some(inner) = weak.upgrade() else {
				break;
			};
			let session = ListSession { inner };

			// Detached so a newer commit can supersede this refresh while it is pending.
			tokio::spawn(async move {
				if let Err(err) = session.apply_committed_search(committed).await {
					tracing::debug!(error = %err, "Search refresh failed.");
				}
			});
		}
	})
}

fn is_stale<T>(ticket: &Ticket, result: &Result<T>) -> bool {
	if ticket.is_current() && !matches!(result, Err(Error::Superseded)) {
		return false;
	}

	tracing::debug!(generation = ticket.generation(), "Superseded fetch dropped.");

	true
}
