//! PostgreSQL sink
//!
//! Creates the destination table when absent and inserts one row per
//! product inside a single transaction. Deduplication is not done
//! server-side: the table handed in is already unique by title.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use super::{ProductSink, SinkError, SinkReport};
use crate::domain::product::{CleanProduct, ProductTable, TIMESTAMP_FORMAT, fields};
use crate::infrastructure::config::DatabaseConfig;

pub struct PostgresSink {
    config: DatabaseConfig,
    table_name: String,
}

impl PostgresSink {
    /// Validates the table name up front; it is interpolated into SQL
    pub fn new(config: DatabaseConfig) -> Result<Self, SinkError> {
        let table_name = config.table.clone();
        validate_table_name(&table_name)?;
        Ok(Self { config, table_name })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn connect(&self) -> Result<PgPool, SinkError> {
        debug!(
            "Connecting to PostgreSQL at {}:{}/{}",
            self.config.host, self.config.port, self.config.name
        );
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&self.config.connection_url())
            .await?;
        Ok(pool)
    }

    /// Write every row of `table` through an existing pool
    pub async fn persist_with_pool(&self, pool: &PgPool, table: &ProductTable) -> Result<usize, SinkError> {
        sqlx::query(&create_table_sql(&self.table_name))
            .execute(pool)
            .await?;

        let insert = insert_sql(&self.table_name);
        let mut tx = pool.begin().await?;
        for row in table {
            let captured_at = parse_timestamp(&row.timestamp).ok_or_else(|| SinkError::InvalidTimestamp {
                title: row.title.clone(),
                value: row.timestamp.clone(),
            })?;
            sqlx::query(&insert)
                .bind(&row.title)
                .bind(row.price)
                .bind(row.rating)
                .bind(colors_column(row)?)
                .bind(&row.size)
                .bind(&row.gender)
                .bind(captured_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(table.len())
    }
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn validate_table_name(name: &str) -> Result<(), SinkError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SinkError::InvalidTableName(name.to_string()))
    }
}

pub fn create_table_sql(table_name: &str) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS {table_name} (
            id SERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            price DOUBLE PRECISION NOT NULL,
            rating DOUBLE PRECISION NOT NULL,
            colors INTEGER NOT NULL,
            size TEXT,
            gender TEXT,
            "timestamp" TIMESTAMP
        )"#
    )
}

fn insert_sql(table_name: &str) -> String {
    format!(
        r#"INSERT INTO {table_name} (title, price, rating, colors, size, gender, "timestamp")
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#
    )
}

/// `colors` is an `INTEGER` column; larger counts abort the insert
fn colors_column(row: &CleanProduct) -> Result<i32, SinkError> {
    i32::try_from(row.colors).map_err(|_| SinkError::ValueOutOfRange {
        title: row.title.clone(),
        field: fields::COLORS,
        value: row.colors.to_string(),
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

#[async_trait]
impl ProductSink for PostgresSink {
    fn name(&self) -> &str {
        "postgresql"
    }

    async fn persist(&self, table: &ProductTable) -> Result<SinkReport, SinkError> {
        let pool = self.connect().await?;
        let result = self.persist_with_pool(&pool, table).await;
        pool.close().await;
        let rows_written = result?;

        info!(
            "🗄️ Saved {} products to PostgreSQL table {}",
            rows_written, self.table_name
        );
        Ok(SinkReport {
            sink: self.name().to_string(),
            rows_written,
            destination: format!("{}/{}", self.config.name, self.table_name),
        })
    }
}
