pub mod db;
pub mod executor;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query;
pub mod schema;
pub mod time_serde;
pub mod value;

mod error;

pub use error::Error;
pub use executor::{BoxFuture, ProfileDirectory, QueryExecutor, RecordStore};
pub use query::{
	Constraint, Cursor, ID_FIELD, NumericRange, OrderBy, PageStart, QueryFilter, QueryRequest,
	Row, SortDirection, TENANT_FIELD,
};
pub use value::{FieldKind, FieldValue};

pub type Result<T, E = Error> = std::result::Result<T, E>;
