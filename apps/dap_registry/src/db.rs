//! Durable storage of registrations.

use std::fmt::Display;

use color_eyre::eyre::WrapErr as _;
use sqlx::{
	error::DatabaseError,
	migrate::MigrateError,
	sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
	types::Json,
};
use tracing::info;

/// A sqlite pool whose schema is up to date.
#[derive(Debug, Clone)]
pub struct MigratedDbPool(SqlitePool);

impl MigratedDbPool {
	pub async fn new(pool: SqlitePool) -> Result<Self, MigrateError> {
		sqlx::migrate!("./migrations").run(&pool).await?;
		info!("database migrated");
		Ok(Self(pool))
	}

	/// A fresh, private database that lives as long as the pool.
	pub async fn in_memory() -> color_eyre::Result<Self> {
		// Every sqlite connection to `:memory:` is its own database, so the pool
		// must keep its one connection alive forever.
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(SqliteConnectOptions::new().in_memory(true))
			.await
			.wrap_err("failed to open in-memory database")?;
		Self::new(pool)
			.await
			.wrap_err("failed to migrate in-memory database")
	}

	/// Waits for in-flight queries, then closes every connection.
	pub async fn close(&self) {
		self.0.close().await
	}

	/// Inserts a registration. The store arbitrates uniqueness of `id`, `did`
	/// and `handle`.
	pub async fn insert(&self, dap: &NewDap<'_>) -> Result<(), InsertError> {
		let result = sqlx::query(
			"INSERT INTO daps (id, did, handle, proof) VALUES (?, ?, ?, ?)",
		)
		.bind(dap.id)
		.bind(dap.did)
		.bind(dap.handle)
		.bind(Json(dap.proof))
		.execute(&self.0)
		.await;

		match result {
			Ok(_) => Ok(()),
			Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
				match UniqueConstraint::from_db_error(&*err) {
					Some(constraint) => Err(InsertError::Conflict(constraint)),
					None => {
						Err(InsertError::UnknownConflict(sqlx::Error::Database(err)))
					}
				}
			}
			Err(err) => Err(InsertError::Database(err)),
		}
	}

	pub async fn find_by_handle(
		&self,
		handle: &str,
	) -> Result<Option<DapRow>, sqlx::Error> {
		let row: Option<(String, Json<serde_json::Value>)> =
			sqlx::query_as("SELECT did, proof FROM daps WHERE handle = ?")
				.bind(handle)
				.fetch_optional(&self.0)
				.await?;
		Ok(row.map(|(did, Json(proof))| DapRow { did, proof }))
	}
}

#[derive(Debug)]
pub struct NewDap<'a> {
	pub id: &'a str,
	pub did: &'a str,
	pub handle: &'a str,
	pub proof: &'a serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DapRow {
	pub did: String,
	pub proof: serde_json::Value,
}

/// The uniqueness constraints of the `daps` table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UniqueConstraint {
	Id,
	Did,
	Handle,
}

impl UniqueConstraint {
	fn from_db_error(err: &dyn DatabaseError) -> Option<Self> {
		Self::from_constraint_or_message(err.constraint(), err.message())
	}

	/// Postgres style drivers report the index name, sqlite only reports
	/// `UNIQUE constraint failed: daps.<column>`.
	fn from_constraint_or_message(
		constraint: Option<&str>,
		message: &str,
	) -> Option<Self> {
		if let Some(constraint) = constraint {
			return match constraint {
				"daps_id_unique" => Some(Self::Id),
				"daps_did_unique" => Some(Self::Did),
				"daps_handle_unique" => Some(Self::Handle),
				_ => None,
			};
		}
		let columns = message.strip_prefix("UNIQUE constraint failed: ")?;
		match columns {
			"daps.id" => Some(Self::Id),
			"daps.did" => Some(Self::Did),
			"daps.handle" => Some(Self::Handle),
			_ => None,
		}
	}
}

impl Display for UniqueConstraint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::Id => "ID",
			Self::Did => "DID",
			Self::Handle => "handle",
		})
	}
}

#[derive(thiserror::Error, Debug)]
pub enum InsertError {
	#[error("DAP with the same {0} already exists")]
	Conflict(UniqueConstraint),
	#[error("Failed to insert DAP")]
	UnknownConflict(#[source] sqlx::Error),
	#[error("Registration Request Failed")]
	Database(#[source] sqlx::Error),
}
