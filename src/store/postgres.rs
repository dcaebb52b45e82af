//! PostgreSQL property repository.
//!
//! Creates the `properties` table and its indexes on connect. Connection attempts are retried with
//! exponential backoff so the indexer can start before the database is reachable.

use super::{
	ImagePolicy, PersistError, PersistedRecord, PropertyFilter, PropertyRepository, StoredProperty,
};
use crate::decoder::PropertyStatus;

use backoff::{ExponentialBackoff, future::retry};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::time::Duration;
use tracing::{debug, info, warn};

const SCHEMA: &[&str] = &[
	"CREATE TABLE IF NOT EXISTS properties (
		id                 BIGSERIAL    PRIMARY KEY,
		mint               VARCHAR(44)  UNIQUE NOT NULL,
		property_state_pda VARCHAR(44)  NOT NULL,
		name               VARCHAR(255) NOT NULL,
		symbol             VARCHAR(10)  NOT NULL,
		authority          VARCHAR(44)  NOT NULL,
		status             VARCHAR(20)  NOT NULL DEFAULT 'active',
		total_supply       BIGINT       NOT NULL DEFAULT 0,
		circulating_supply BIGINT       NOT NULL DEFAULT 0,
		decimals           INTEGER      NOT NULL DEFAULT 0,
		property_type      VARCHAR(50),
		location           VARCHAR(255),
		total_value_usd    BIGINT       NOT NULL DEFAULT 0,
		annual_yield       BIGINT       NOT NULL DEFAULT 0,
		metadata_uri       TEXT,
		image              TEXT,
		current_epoch      BIGINT       NOT NULL DEFAULT 0,
		created_at         TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
		updated_at         TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
		last_indexed_slot  BIGINT       NOT NULL DEFAULT 0
	)",
	"ALTER TABLE properties ADD COLUMN IF NOT EXISTS image TEXT",
	"CREATE INDEX IF NOT EXISTS idx_properties_mint ON properties(mint)",
	"CREATE INDEX IF NOT EXISTS idx_properties_status ON properties(status)",
	"CREATE INDEX IF NOT EXISTS idx_properties_property_type ON properties(property_type)",
	"CREATE INDEX IF NOT EXISTS idx_properties_updated_at ON properties(updated_at)",
];

const COLUMNS: &str = "id, mint, property_state_pda, name, symbol, authority, status, \
	total_supply, circulating_supply, decimals, property_type, location, total_value_usd, \
	annual_yield, metadata_uri, image, current_epoch, created_at, updated_at, last_indexed_slot";

/// Pool and startup options for [`PostgresPropertyStore`].
#[derive(Debug, Clone)]
pub struct PostgresOptions {
	pub max_connections: u32,
	pub acquire_timeout: Duration,
	/// Give up connecting after this long.
	pub connect_deadline: Duration,
}

impl Default for PostgresOptions {
	fn default() -> Self {
		Self {
			max_connections: 10,
			acquire_timeout: Duration::from_secs(30),
			connect_deadline: Duration::from_secs(60),
		}
	}
}

#[derive(Clone)]
pub struct PostgresPropertyStore {
	pool: PgPool,
}

impl PostgresPropertyStore {
	/// Connect to PostgreSQL and bootstrap the schema.
	///
	/// # Arguments
	/// * `database_url` - libpq style connection string.
	/// * `options` - Pool sizing and connect deadline.
	pub async fn connect(
		database_url: &str,
		options: PostgresOptions,
	) -> Result<Self, PersistError> {
		let policy = ExponentialBackoff {
			max_elapsed_time: Some(options.connect_deadline),
			..Default::default()
		};

		let pool = retry(policy, || async {
			PgPoolOptions::new()
				.max_connections(options.max_connections)
				.acquire_timeout(options.acquire_timeout)
				.connect(database_url)
				.await
				.map_err(|e| {
					warn!("Database connection failed, retrying: {}", e);
					backoff::Error::transient(e)
				})
		})
		.await?;

		let store = Self { pool };
		store.init_schema().await?;
		info!("Connected to PostgreSQL and initialized schema");
		Ok(store)
	}

	/// Create the table and indexes if they don't already exist.
	pub async fn init_schema(&self) -> Result<(), PersistError> {
		for statement in SCHEMA {
			sqlx::query(statement).execute(&self.pool).await?;
		}
		debug!("Property schema initialized");
		Ok(())
	}

	fn upsert_sql(image_policy: ImagePolicy) -> String {
		let image = match image_policy {
			ImagePolicy::Overwrite => "EXCLUDED.image",
			ImagePolicy::KeepExisting => {
				"CASE WHEN EXCLUDED.image = '' THEN COALESCE(properties.image, '') \
				 ELSE EXCLUDED.image END"
			}
		};

		format!(
			"INSERT INTO properties (
				mint, property_state_pda, name, symbol, authority, status,
				total_supply, circulating_supply, decimals, property_type, location,
				total_value_usd, annual_yield, metadata_uri, image, current_epoch, last_indexed_slot
			) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
			ON CONFLICT (mint) DO UPDATE SET
				property_state_pda = EXCLUDED.property_state_pda,
				name = EXCLUDED.name,
				symbol = EXCLUDED.symbol,
				authority = EXCLUDED.authority,
				status = EXCLUDED.status,
				total_supply = EXCLUDED.total_supply,
				circulating_supply = EXCLUDED.circulating_supply,
				decimals = EXCLUDED.decimals,
				property_type = EXCLUDED.property_type,
				location = EXCLUDED.location,
				total_value_usd = EXCLUDED.total_value_usd,
				annual_yield = EXCLUDED.annual_yield,
				metadata_uri = EXCLUDED.metadata_uri,
				image = {image},
				current_epoch = EXCLUDED.current_epoch,
				last_indexed_slot = EXCLUDED.last_indexed_slot,
				updated_at = NOW()
			RETURNING {COLUMNS}"
		)
	}
}

fn row_to_record(row: &PgRow) -> Result<PersistedRecord, PersistError> {
	let status: String = row.try_get("status")?;
	let status = status
		.parse::<PropertyStatus>()
		.map_err(PersistError::CorruptRow)?;

	Ok(PersistedRecord {
		id: row.try_get("id")?,
		property: StoredProperty {
			mint: row.try_get("mint")?,
			property_state_pda: row.try_get("property_state_pda")?,
			name: row.try_get("name")?,
			symbol: row.try_get("symbol")?,
			authority: row.try_get("authority")?,
			status,
			total_supply: row.try_get("total_supply")?,
			circulating_supply: row.try_get("circulating_supply")?,
			decimals: row.try_get("decimals")?,
			property_type: row
				.try_get::<Option<String>, _>("property_type")?
				.unwrap_or_default(),
			location: row.try_get::<Option<String>, _>("location")?.unwrap_or_default(),
			total_value_usd: row.try_get("total_value_usd")?,
			annual_yield: row.try_get("annual_yield")?,
			metadata_uri: row
				.try_get::<Option<String>, _>("metadata_uri")?
				.unwrap_or_default(),
			image: row.try_get::<Option<String>, _>("image")?.unwrap_or_default(),
			current_epoch: row.try_get("current_epoch")?,
			last_indexed_slot: row.try_get("last_indexed_slot")?,
		},
		created_at: row.try_get("created_at")?,
		updated_at: row.try_get("updated_at")?,
	})
}

#[async_trait::async_trait]
impl PropertyRepository for PostgresPropertyStore {
	async fn upsert(
		&self,
		property: &StoredProperty,
		image_policy: ImagePolicy,
	) -> Result<PersistedRecord, PersistError> {
		let sql = Self::upsert_sql(image_policy);
		let row = sqlx::query(&sql)
			.bind(&property.mint)
			.bind(&property.property_state_pda)
			.bind(&property.name)
			.bind(&property.symbol)
			.bind(&property.authority)
			.bind(property.status.as_str())
			.bind(property.total_supply)
			.bind(property.circulating_supply)
			.bind(property.decimals)
			.bind(&property.property_type)
			.bind(&property.location)
			.bind(property.total_value_usd)
			.bind(property.annual_yield)
			.bind(&property.metadata_uri)
			.bind(&property.image)
			.bind(property.current_epoch)
			.bind(property.last_indexed_slot)
			.fetch_one(&self.pool)
			.await?;

		row_to_record(&row)
	}

	async fn get_by_mint(&self, mint: &str) -> Result<Option<PersistedRecord>, PersistError> {
		let sql = format!("SELECT {COLUMNS} FROM properties WHERE mint = $1");
		let row = sqlx::query(&sql)
			.bind(mint)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_record).transpose()
	}

	async fn list(&self, filter: &PropertyFilter) -> Result<Vec<PersistedRecord>, PersistError> {
		let mut query: QueryBuilder<Postgres> =
			QueryBuilder::new(format!("SELECT {COLUMNS} FROM properties WHERE 1=1"));

		if let Some(status) = &filter.status {
			query.push(" AND status = ").push_bind(status.clone());
		}
		if let Some(min) = filter.min_value {
			query.push(" AND total_value_usd >= ").push_bind(min);
		}
		if let Some(max) = filter.max_value {
			query.push(" AND total_value_usd <= ").push_bind(max);
		}
		if let Some(kind) = &filter.property_type {
			query.push(" AND property_type = ").push_bind(kind.clone());
		}
		query.push(" ORDER BY created_at DESC, id DESC");

		let rows = query.build().fetch_all(&self.pool).await?;
		rows.iter().map(row_to_record).collect()
	}
}
