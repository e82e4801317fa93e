//! Test support: scratch Postgres databases, seeded fixtures and executor wrappers.

pub mod executors;
pub mod fixtures;

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use rapport_storage::{db::Db, postgres::PgExecutor};

/// Server URL for Postgres-backed tests.
pub const DSN_VAR: &str = "RAPPORT_PG_DSN";

/// Databases tried in order when connecting to create or drop scratch databases.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok().filter(|dsn| !dsn.trim().is_empty())
}

/// A uniquely named database that lives for one test.
///
/// Call [`TestDatabase::cleanup`] at the end of a test. If the test panics first, drop removes
/// the database on a helper thread.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn)
			.map_err(|err| Error::Message(format!("{DSN_VAR} is not a valid DSN: {err}.")))?;
		let (maintenance, mut conn) = connect_maintenance(&server).await?;
		let name = format!("rapport_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(|err| Error::Message(format!("Failed to create {name}: {err}.")))?;

		let dsn = server.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Connects to the scratch database and bootstraps the schema.
	pub async fn executor(&self) -> Result<PgExecutor> {
		let cfg = rapport_config::Postgres { dsn: self.dsn.clone(), pool_max_conns: 2 };
		let db = Db::connect(&cfg).await?;

		db.ensure_schema().await?;

		Ok(PgExecutor::new(db))
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// Drop may run inside a runtime, so the blocking cleanup gets its own thread.
		let handle = thread::spawn(move || {
			let outcome = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(err.to_string()))
				.and_then(|runtime| runtime.block_on(drop_database(&name, &maintenance)));

			if let Err(err) = outcome {
				eprintln!("Failed to drop test database {name}: {err}");
			}
		});

		let _ = handle.join();
	}
}

async fn connect_maintenance(
	server: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut errors = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => errors.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", errors.join("; "))))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	// Pools from the test may still hold connections.
	let _ = sqlx::query(
		"SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.fetch_all(&mut conn)
	.await;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;

	Ok(())
}
