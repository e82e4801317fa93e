mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Feed, Postgres, Security, Service, Storage, Tenant};

use std::{fs, path::Path};

const MAX_RESOLVE_ATTEMPTS: u32 = 10;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.page_size == 0 {
		return Err(Error::Validation {
			message: "feed.page_size must be greater than zero.".to_string(),
		});
	}
	if cfg.feed.max_page_size < cfg.feed.page_size {
		return Err(Error::Validation {
			message: "feed.max_page_size must be greater than or equal to feed.page_size."
				.to_string(),
		});
	}
	if cfg.feed.search_debounce_ms == 0 {
		return Err(Error::Validation {
			message: "feed.search_debounce_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.tenant.resolve_attempts == 0 || cfg.tenant.resolve_attempts > MAX_RESOLVE_ATTEMPTS {
		return Err(Error::Validation {
			message: format!("tenant.resolve_attempts must be in the range 1-{MAX_RESOLVE_ATTEMPTS}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.service.http_bind = cfg.service.http_bind.trim().to_string();
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.storage.postgres.dsn = cfg.storage.postgres.dsn.trim().to_string();
}
