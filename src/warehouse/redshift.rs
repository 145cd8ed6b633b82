//! Redshift connection over the Postgres wire protocol
//!
//! Statements go through the simple query protocol so that COPY and
//! multi-statement scripts behave the way they do in `psql`.

use super::executor::{ResultSet, SqlExecutor};
use crate::config::DwhConfig;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Column, ConnectOptions, Connection, Row};

/// A single session on the warehouse
pub struct RedshiftConnection {
    conn: PgConnection,
    /// host:port/db (for logging)
    target: String,
}

impl RedshiftConnection {
    /// Connect using the endpoint and credentials recorded in the config
    ///
    /// Fails with a missing-field error when the cluster endpoint has not
    /// been recorded yet.
    pub async fn connect(config: &DwhConfig) -> Result<Self> {
        let host = config.db_host()?;
        let options = PgConnectOptions::new()
            .host(host)
            .port(config.db.port)
            .username(&config.db.user)
            .password(&config.db.password)
            .database(&config.db.name)
            .extra_float_digits(None::<i8>)
            .disable_statement_logging();
        Self::connect_with(options, format!("{host}:{}/{}", config.db.port, config.db.name)).await
    }

    /// Connect using a postgres URL
    pub async fn connect_url(url: &str) -> Result<Self> {
        let options: PgConnectOptions = url
            .parse()
            .map_err(|e| crate::error::Error::config(format!("Invalid database URL: {e}")))?;
        let target = format!(
            "{}:{}/{}",
            options.get_host(),
            options.get_port(),
            options.get_database().unwrap_or_default()
        );
        Self::connect_with(options, target).await
    }

    async fn connect_with(options: PgConnectOptions, target: String) -> Result<Self> {
        tracing::debug!(endpoint = %target, "Connecting to warehouse");
        let conn = options.connect().await?;
        tracing::info!(endpoint = %target, "Connected to warehouse");
        Ok(Self { conn, target })
    }

    /// Close the session
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        tracing::debug!(endpoint = %self.target, "Warehouse connection closed");
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for RedshiftConnection {
    async fn execute(&mut self, sql: &str) -> Result<u64> {
        tracing::trace!(sql, "Executing statement");
        let result = sqlx::raw_sql(sql).execute(&mut self.conn).await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        tracing::trace!(sql, "Running query");
        let rows = sqlx::raw_sql(sql).fetch_all(&mut self.conn).await?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        // Simple protocol results are text, so every column decodes as a string
        let rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.try_get_unchecked::<Option<String>, _>(i))
                    .collect::<std::result::Result<Vec<_>, _>>()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ResultSet::new(columns, rows))
    }
}
