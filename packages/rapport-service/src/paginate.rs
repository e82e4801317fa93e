//! Cursor and offset pagination over one entity's feed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use rapport_storage::{
	Cursor, FieldKind, FieldValue, ID_FIELD, OrderBy, PageStart, QueryExecutor, QueryFilter,
	QueryRequest, Row,
};

use crate::{
	Error, Result,
	entity::EntitySchema,
	filter::{self, FilterState, SkippedInput},
	sort::{self, SortConfig},
};

/// Everything that defines which rows a list shows and in what order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
	#[serde(default)]
	pub filters: FilterState,
	#[serde(default)]
	pub search: Option<String>,
	#[serde(default)]
	pub sort: Option<SortConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSizePolicy {
	pub default: u32,
	pub max: u32,
}
impl PageSizePolicy {
	/// Zero selects the default. Larger than `max` is clamped.
	pub fn clamp(self, requested: u32) -> u32 {
		match requested {
			0 => self.default.min(self.max),
			size => size.min(self.max),
		}
	}
}
impl From<&rapport_config::Feed> for PageSizePolicy {
	fn from(feed: &rapport_config::Feed) -> Self {
		Self { default: feed.page_size, max: feed.max_page_size }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
	pub rows: Vec<Row>,
	pub has_more: bool,
	/// Continuation for the next page. Present only when `has_more` is true.
	pub next_cursor: Option<Cursor>,
	/// Known only for offset pages.
	pub total_count: Option<u64>,
	pub order: OrderBy,
	pub skipped: Vec<SkippedInput>,
}

#[derive(Clone)]
pub struct CursorPaginator {
	executor: Arc<dyn QueryExecutor>,
	schema: &'static EntitySchema,
	sizes: PageSizePolicy,
}
impl CursorPaginator {
	pub fn new(
		executor: Arc<dyn QueryExecutor>,
		schema: &'static EntitySchema,
		sizes: PageSizePolicy,
	) -> Self {
		Self { executor, schema, sizes }
	}

	pub fn schema(&self) -> &'static EntitySchema {
		self.schema
	}

	pub fn page_size(&self, requested: u32) -> u32 {
		self.sizes.clamp(requested)
	}

	/// Fetches up to `page_size` rows strictly after `cursor` in the resolved order.
	///
	/// One extra row is requested to learn whether another page exists. It is never returned.
	pub async fn fetch_page(
		&self,
		organization_id: Uuid,
		spec: &QuerySpec,
		cursor: Option<Cursor>,
		page_size: u32,
	) -> Result<Page> {
		let page_size = self.page_size(page_size);
		let (filter, order, skipped) = self.prepare(organization_id, spec);

		if let Some(cursor) = &cursor {
			self.check_cursor(order, cursor)?;
		}

		let request = QueryRequest {
			filter,
			order,
			start: PageStart::After(cursor),
			limit: page_size.saturating_add(1),
		};
		let mut rows = self.run(&request).await?;
		let has_more = rows.len() > page_size as usize;

		rows.truncate(page_size as usize);

		let next_cursor = match rows.last() {
			Some(last) if has_more => Some(self.cursor_for(order, last)?),
			_ => None,
		};

		Ok(Page { rows, has_more, next_cursor, total_count: None, order, skipped })
	}

	/// Offset variant that also reports the total number of matching rows.
	pub async fn fetch_offset_page(
		&self,
		organization_id: Uuid,
		spec: &QuerySpec,
		offset: u64,
		page_size: u32,
	) -> Result<Page> {
		let page_size = self.page_size(page_size);
		let (filter, order, skipped) = self.prepare(organization_id, spec);
		let total = self.executor.count(&filter).await.map_err(|err| self.failed(err))?;
		let request =
			QueryRequest { filter, order, start: PageStart::Offset(offset), limit: page_size };
		let rows = self.run(&request).await?;
		let has_more = offset.saturating_add(rows.len() as u64) < total;

		Ok(Page { rows, has_more, next_cursor: None, total_count: Some(total), order, skipped })
	}

	fn prepare(
		&self,
		organization_id: Uuid,
		spec: &QuerySpec,
	) -> (QueryFilter, OrderBy, Vec<SkippedInput>) {
		let compiled = filter::compile(self.schema, &spec.filters, spec.search.as_deref());
		let order = sort::resolve(self.schema, spec.sort.as_ref());
		let filter = QueryFilter {
			table: self.schema.table,
			organization_id,
			constraints: compiled.constraints,
		};

		(filter, order, compiled.skipped)
	}

	async fn run(&self, request: &QueryRequest) -> Result<Vec<Row>> {
		let rows = self.executor.run_query(request).await.map_err(|err| self.failed(err))?;

		tracing::debug!(entity = self.schema.name, rows = rows.len(), "Page rows fetched.");

		Ok(rows)
	}

	fn failed(&self, err: rapport_storage::Error) -> Error {
		tracing::error!(entity = self.schema.name, error = %err, "Page fetch failed.");

		err.into()
	}

	fn sort_kind(&self, order: OrderBy) -> Result<FieldKind> {
		self.schema.sort_spec(order.field).map(|spec| spec.kind).ok_or_else(|| {
			Error::InvalidRequest {
				message: format!("{} is not sortable on {}.", order.field, self.schema.name),
			}
		})
	}

	/// A cursor only continues an order whose sort field has the same kind as its value.
	fn check_cursor(&self, order: OrderBy, cursor: &Cursor) -> Result<()> {
		let kind = self.sort_kind(order)?;

		if cursor.value.fits(kind) {
			return Ok(());
		}

		Err(Error::InvalidRequest {
			message: format!(
				"Cursor value does not match sort field {} on {}.",
				order.field, self.schema.name
			),
		})
	}

	fn cursor_for(&self, order: OrderBy, row: &Row) -> Result<Cursor> {
		let kind = self.sort_kind(order)?;
		let value = row
			.get(order.field)
			.and_then(|value| FieldValue::from_json(kind, value))
			.filter(|value| !value.is_null())
			.ok_or_else(|| Error::Storage {
				message: format!("Row is missing sort field {}.", order.field),
			})?;
		let id = row
			.get(ID_FIELD)
			.and_then(Value::as_str)
			.and_then(|raw| Uuid::parse_str(raw).ok())
			.ok_or_else(|| Error::Storage { message: "Row is missing its id.".to_string() })?;

		Ok(Cursor { value, id })
	}
}

/// Decodes storage rows into typed records.
pub fn decode_rows<T>(rows: Vec<Row>) -> Result<Vec<T>>
where
	T: serde::de::DeserializeOwned,
{
	rows.into_iter()
		.map(|row| {
			serde_json::from_value(Value::Object(row))
				.map_err(|err| Error::Storage { message: format!("Failed to decode row: {err}.") })
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use crate::paginate::PageSizePolicy;

	#[test]
	fn page_sizes_are_clamped() {
		let sizes = PageSizePolicy { default: 20, max: 100 };

		assert_eq!(sizes.clamp(0), 20);
		assert_eq!(sizes.clamp(7), 7);
		assert_eq!(sizes.clamp(500), 100);
	}
}
