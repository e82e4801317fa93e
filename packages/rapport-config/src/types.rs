use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub feed: Feed,
	#[serde(default)]
	pub tenant: Tenant,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feed {
	/// Page size used when a caller does not ask for one.
	#[serde(default = "default_page_size")]
	pub page_size: u32,
	/// Upper bound for caller supplied page sizes. Larger requests are clamped.
	#[serde(default = "default_max_page_size")]
	pub max_page_size: u32,
	/// Quiet period before raw search input is committed.
	#[serde(default = "default_search_debounce_ms")]
	pub search_debounce_ms: u64,
}
impl Default for Feed {
	fn default() -> Self {
		Self {
			page_size: default_page_size(),
			max_page_size: default_max_page_size(),
			search_debounce_ms: default_search_debounce_ms(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tenant {
	/// Total attempts for the one-time profile to organization resolution.
	#[serde(default = "default_resolve_attempts")]
	pub resolve_attempts: u32,
	#[serde(default = "default_resolve_backoff_ms")]
	pub resolve_backoff_ms: u64,
}
impl Default for Tenant {
	fn default() -> Self {
		Self {
			resolve_attempts: default_resolve_attempts(),
			resolve_backoff_ms: default_resolve_backoff_ms(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	#[serde(default = "default_bind_localhost_only")]
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: default_bind_localhost_only() }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_page_size() -> u32 {
	20
}

fn default_max_page_size() -> u32 {
	100
}

fn default_search_debounce_ms() -> u64 {
	500
}

fn default_resolve_attempts() -> u32 {
	3
}

fn default_resolve_backoff_ms() -> u64 {
	100
}

fn default_bind_localhost_only() -> bool {
	true
}
