#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Failed to decode row: {0}")]
	Decode(String),
	#[error("Storage unavailable: {0}")]
	Unavailable(String),
}
