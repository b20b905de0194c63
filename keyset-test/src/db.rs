use keyset_core::{init_tracing, ConfigProperties, KeysetConfig, LogConfig};
use keyset_data::{DataError, PaginationConfig};
use keyset_data_sqlx::{SqlxErrorExt, SqlxRepository};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};

use crate::fixtures::{Group, Run};

/// Configuration every [`TestDb`] starts from.
pub const TEST_CONFIG: &str = r#"
keyset:
  log:
    level: warn
  pagination:
    dialect: sqlite
    max_page_size: 500
"#;

const SCHEMA: &[&str] = &[
    "CREATE TABLE groups (
        id TEXT PRIMARY KEY,
        full_path TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE runs (
        id TEXT PRIMARY KEY,
        group_id TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
];

/// Install a subscriber for test output. Safe to call from every test.
pub fn init_test_tracing() {
    let config = KeysetConfig::from_yaml_str(TEST_CONFIG, "test")
        .and_then(|raw| LogConfig::from_config(&raw))
        .unwrap_or_default();
    init_tracing(&config);
}

/// An in-memory SQLite database holding the fixture tables.
pub struct TestDb {
    pool: SqlitePool,
    config: PaginationConfig,
}

impl TestDb {
    pub async fn new() -> Result<Self, DataError> {
        let raw = KeysetConfig::from_yaml_str(TEST_CONFIG, "test")
            .map_err(|e| DataError::internal(e.to_string()))?;
        let config =
            PaginationConfig::from_config(&raw).map_err(|e| DataError::internal(e.to_string()))?;
        Self::with_config(config).await
    }

    pub async fn with_config(config: PaginationConfig) -> Result<Self, DataError> {
        // each connection to sqlite::memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(SqlxErrorExt::into_data_error)?;
        for ddl in SCHEMA {
            sqlx::query(ddl)
                .execute(&pool)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
        }
        Ok(Self { pool, config })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> PaginationConfig {
        self.config
    }

    pub fn groups(&self) -> SqlxRepository<Group, Sqlite> {
        SqlxRepository::new(self.pool.clone(), self.config)
    }

    pub fn runs(&self) -> SqlxRepository<Run, Sqlite> {
        SqlxRepository::new(self.pool.clone(), self.config)
    }

    pub async fn insert_groups(&self, groups: &[Group]) -> Result<(), DataError> {
        for group in groups {
            sqlx::query("INSERT INTO groups (id, full_path, created_at) VALUES (?, ?, ?)")
                .bind(&group.id)
                .bind(&group.full_path)
                .bind(&group.created_at)
                .execute(&self.pool)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
        }
        Ok(())
    }

    pub async fn insert_runs(&self, runs: &[Run]) -> Result<(), DataError> {
        for run in runs {
            sqlx::query("INSERT INTO runs (id, group_id, status, created_at) VALUES (?, ?, ?, ?)")
                .bind(&run.id)
                .bind(&run.group_id)
                .bind(&run.status)
                .bind(&run.created_at)
                .execute(&self.pool)
                .await
                .map_err(SqlxErrorExt::into_data_error)?;
        }
        Ok(())
    }
}
