use crate::core::{EnrichedEntity, EtlError};
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

/// One row of the read-back preview.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TableSample {
    #[sqlx(rename = "Name")]
    pub name: String,
    #[sqlx(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
    #[sqlx(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,
}

/// SQLite database holding the output table.
pub struct SqliteSink {
    pool: SqlitePool,
}

/// Quotes a table name for use in SQL. Empty names and names with `"` are rejected.
pub fn quote_table_name(table: &str) -> Result<String, EtlError> {
    if table.is_empty() || table.contains('"') || table.contains('\0') {
        return Err(EtlError::InvalidTableName(table.to_string()));
    }
    Ok(format!("\"{table}\""))
}

impl SqliteSink {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        debug!("Opened database {}", path.display());
        Ok(SqliteSink { pool })
    }

    /// Replaces the contents of `table` with `entities` in one transaction.
    pub async fn replace_table(&self, table: &str, entities: &[EnrichedEntity]) -> Result<u64> {
        let quoted = quote_table_name(table)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {quoted}"))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to drop table {table}"))?;
        sqlx::query(&format!(
            "CREATE TABLE {quoted} (\
             Name TEXT, \
             MC_USD_Billion REAL, \
             MC_GBP_Billion REAL, \
             MC_EUR_Billion REAL, \
             MC_INR_Billion REAL)"
        ))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to create table {table}"))?;

        let insert = format!(
            "INSERT INTO {quoted} \
             (Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion) \
             VALUES (?, ?, ?, ?, ?)"
        );
        let mut inserted = 0;
        for entity in entities {
            let result = sqlx::query(&insert)
                .bind(&entity.name)
                .bind(entity.mc_usd_billion)
                .bind(entity.mc_gbp_billion)
                .bind(entity.mc_eur_billion)
                .bind(entity.mc_inr_billion)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert {:?} into {table}", entity.name))?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!(rows = inserted, table, "Replaced table contents");
        Ok(inserted)
    }

    /// First `limit` rows of `table` in insertion order.
    pub async fn sample(&self, table: &str, limit: u32) -> Result<Vec<TableSample>> {
        let quoted = quote_table_name(table)?;
        let rows = sqlx::query_as::<_, TableSample>(&format!(
            "SELECT Name, MC_USD_Billion, MC_GBP_Billion FROM {quoted} ORDER BY rowid LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to query table {table}"))?;
        Ok(rows)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
