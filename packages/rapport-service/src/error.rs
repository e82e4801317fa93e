pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The request's generation was replaced before its result could be applied.
	#[error("Superseded by a newer request.")]
	Superseded,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Tenant resolution failed: {message}")]
	TenantResolution { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
}

impl From<rapport_storage::Error> for Error {
	fn from(err: rapport_storage::Error) -> Self {
		match err {
			rapport_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			rapport_storage::Error::NotFound(message) => Self::NotFound { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
